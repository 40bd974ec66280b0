use std::time::Duration;

use super::service_error::ServiceError;

/// Failure kinds produced inside the extraction pipeline.
///
/// Every message starts with the kind name so that a flattened
/// `ExtractionResult::error` string still identifies what went wrong.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("UnsupportedFileType: {0}")]
    UnsupportedFileType(String),
    #[error("NoTextExtracted: {0}")]
    NoTextExtracted(String),
    #[error("ExtractionTimeout: attempt exceeded {}ms", .0.as_millis())]
    ExtractionTimeout(Duration),
    #[error("PageExtractionFailed: {0}")]
    PageExtractionFailed(String),
    #[error("ChunkingFailed: {0}")]
    ChunkingFailed(String),
    #[error("ExtractorNotFound: {0}")]
    ExtractorNotFound(String),
    #[error("MissingCredentials: {0}")]
    MissingCredentials(String),
    #[error("PayloadTooLarge: {size} bytes exceeds the {limit} byte upload limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("Cancelled: {0}")]
    Cancelled(String),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
}

impl ExtractionError {
    /// Whether another attempt against the same extractor can change the outcome.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoTextExtracted(_) | Self::ExtractionTimeout(_) => true,
            Self::Service(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether the failure must end the whole `process()` call, skipping any
    /// fallback strategy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType(_)
                | Self::ExtractorNotFound(_)
                | Self::MissingCredentials(_)
                | Self::Cancelled(_)
        )
    }

    /// `NoTextExtracted` carries the least information about why a stage failed.
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::NoTextExtracted(_))
    }
}
