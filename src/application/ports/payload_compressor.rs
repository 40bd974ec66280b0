use thiserror::Error;

use crate::domain::SupportedFileType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompressionError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("JPEG encode failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPayload {
    pub data: Vec<u8>,
    pub mime: String,
}

/// Best-effort shrinking of an upload so it fits under `limit` bytes.
///
/// Implementations return the smallest payload they managed to produce; the
/// caller decides whether it is small enough.
pub trait PayloadCompressor: Send + Sync {
    fn compress(
        &self,
        data: &[u8],
        file_type: SupportedFileType,
        limit: usize,
    ) -> Result<CompressedPayload, CompressionError>;
}
