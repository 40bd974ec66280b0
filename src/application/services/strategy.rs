use crate::domain::{ExtractionError, ExtractionMethod, ProcessingDetail};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
}

/// What one extraction strategy produced, including diagnostics gathered on
/// the way whether it succeeded or not.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    pub outcome: Result<ExtractedText, ExtractionError>,
    pub page_count: u32,
    pub details: Vec<ProcessingDetail>,
}

impl StrategyRun {
    pub fn failed(error: ExtractionError, page_count: u32, details: Vec<ProcessingDetail>) -> Self {
        Self {
            outcome: Err(error),
            page_count,
            details,
        }
    }

    pub fn succeeded(
        text: String,
        method: ExtractionMethod,
        page_count: u32,
        details: Vec<ProcessingDetail>,
    ) -> Self {
        Self {
            outcome: Ok(ExtractedText { text, method }),
            page_count,
            details,
        }
    }
}
