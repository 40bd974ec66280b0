mod ocr_client;
mod page_splitter;
mod payload_compressor;
mod sleeper;
mod vision_client;

pub use ocr_client::{OcrClient, OcrResponse};
pub use page_splitter::PageSplitter;
pub use payload_compressor::{CompressedPayload, CompressionError, PayloadCompressor};
pub use sleeper::Sleeper;
pub use vision_client::{VisionClient, VisionRequest};

pub use crate::domain::ServiceError;
