use lopdf::{Document as PdfDocument, Object};

use crate::application::ports::PageSplitter;
use crate::domain::{ExtractionError, PageRange};

/// Page-range extraction on top of `lopdf`.
///
/// The source is loaded as a full object graph, every page outside the range
/// is removed from the page tree, and unreachable objects are pruned before
/// the new document is written out. Catalog entries that reach into the page
/// tree from outside it, such as outlines and named destinations, are dropped
/// first so they cannot keep removed pages alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfPageSplitter;

const DETACHED_CATALOG_KEYS: [&[u8]; 3] = [b"Outlines", b"Names", b"OpenAction"];

impl LopdfPageSplitter {
    pub fn new() -> Self {
        Self
    }
}

impl PageSplitter for LopdfPageSplitter {
    fn page_count(&self, data: &[u8]) -> Option<u32> {
        match load(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(e) => {
                tracing::debug!(error = %e, "Page tree unreadable");
                None
            }
        }
    }

    fn split(&self, data: &[u8], range: PageRange) -> Result<Vec<u8>, ExtractionError> {
        let mut doc = load(data)?;

        let pages = doc.get_pages();
        let total = pages.len() as u32;
        if range.start > total {
            return Err(ExtractionError::PageExtractionFailed(format!(
                "page range {range} starts beyond the document's {total} pages"
            )));
        }

        let end = range.end.min(total);
        if end < range.end {
            tracing::warn!(
                requested = %range,
                total,
                "Page range runs past the end of the document, clamping"
            );
        }

        let outside: Vec<u32> = pages
            .keys()
            .copied()
            .filter(|n| *n < range.start || *n > end)
            .collect();

        doc.delete_pages(&outside);
        detach_catalog_links(&mut doc);
        doc.prune_objects();
        doc.renumber_objects();

        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(|e| {
            ExtractionError::PageExtractionFailed(format!("failed to write pages {range}: {e}"))
        })?;

        tracing::debug!(
            pages = %range,
            source_bytes = data.len(),
            chunk_bytes = out.len(),
            "Extracted page range"
        );

        Ok(out)
    }
}

fn detach_catalog_links(doc: &mut PdfDocument) {
    let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) else {
        return;
    };
    if let Ok(catalog) = doc.get_object_mut(root).and_then(Object::as_dict_mut) {
        for key in DETACHED_CATALOG_KEYS {
            catalog.remove(key);
        }
    }
}

fn load(data: &[u8]) -> Result<PdfDocument, ExtractionError> {
    PdfDocument::load_mem(data)
        .map_err(|e| ExtractionError::PageExtractionFailed(format!("failed to parse PDF: {e}")))
}
