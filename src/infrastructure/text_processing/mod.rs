mod azure_doc_intel_client;
mod extractor_factory;
mod image_payload_compressor;
mod lopdf_page_splitter;
mod mock_ocr_client;
mod mock_vision_client;
mod openai_vision_client;
mod text_sanitizer;

pub use azure_doc_intel_client::{
    AnalyzeError, AnalyzeResponse, AnalyzeResult, AnalyzedPage, AzureDocIntelClient,
};
pub use extractor_factory::{ExtractorFactory, ExtractorFactoryError};
pub use image_payload_compressor::ImagePayloadCompressor;
pub use lopdf_page_splitter::LopdfPageSplitter;
pub use mock_ocr_client::MockOcrClient;
pub use mock_vision_client::MockVisionClient;
pub use openai_vision_client::OpenAiVisionClient;
pub use text_sanitizer::sanitize_extracted_text;
