use crate::domain::{ExtractionError, PageRange};

/// Produces a standalone PDF holding only the pages in `range`.
pub trait PageSplitter: Send + Sync {
    fn split(&self, data: &[u8], range: PageRange) -> Result<Vec<u8>, ExtractionError>;

    /// Page count read from the parsed page tree. `None` when the splitter
    /// cannot parse the document or does not know.
    fn page_count(&self, _data: &[u8]) -> Option<u32> {
        None
    }
}
