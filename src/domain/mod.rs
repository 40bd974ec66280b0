mod chunk;
mod document;
mod extraction;
mod extraction_error;
mod file_type;
mod service_error;

pub use chunk::{Chunk, ChunkResult, PageRange};
pub use document::{DocumentBuffer, DocumentId};
pub use extraction::{
    DocumentMetadata, ExtractionMethod, ExtractionResult, ProcessingDetail, meets_min_text_len,
};
pub use extraction_error::ExtractionError;
pub use file_type::SupportedFileType;
pub use service_error::ServiceError;
