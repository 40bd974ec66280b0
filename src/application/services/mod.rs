mod chunk_orchestrator;
mod extraction_context;
mod extraction_pipeline;
mod file_type_detector;
mod hybrid_orchestrator;
mod ocr_extractor;
mod page_counter;
mod retry;
mod strategy;
mod vision_extractor;

pub use chunk_orchestrator::{
    ChunkOrchestrator, ChunkPlan, ChunkedExtraction, ChunkingPolicy, INTER_CHUNK_DELAY,
    MAX_CHUNK_SIZE, MAX_PLANNED_PAGES, OCR_PAGE_LIMIT, PreparedChunk,
};
pub use extraction_context::{CancellationSignal, DEFAULT_ATTEMPT_TIMEOUT, ExtractionContext};
pub use extraction_pipeline::{
    ExtractionPipeline, OCR_COST_PER_PAGE_USD, ProcessOptions, VISION_COST_PER_PAGE_USD,
    cost_estimate,
};
pub use file_type_detector::{
    DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MIN_FILE_SIZE_BYTES, FileTypeDetector, ValidationReport,
};
pub use hybrid_orchestrator::{
    HybridOrchestrator, OCR_CONTEXT_CHARS, OCR_ONLY_NOTE, build_vision_prompt,
};
pub use ocr_extractor::{OcrExtractor, OcrOutput};
pub use page_counter::{PageCount, PageCountMethod, PageCounter};
pub use retry::{Attempted, ExtractorConfig, RetryPolicy, run_with_retry};
pub use strategy::{ExtractedText, StrategyRun};
pub use vision_extractor::{
    DEFAULT_VISION_INSTRUCTION, VISION_PAYLOAD_LIMIT_BYTES, VisionExtractor, VisionOutput,
};
