use std::sync::Arc;

use crate::domain::{
    DocumentBuffer, ExtractionError, ExtractionMethod, ProcessingDetail, meets_min_text_len,
};

use super::chunk_orchestrator::ChunkOrchestrator;
use super::extraction_context::ExtractionContext;
use super::strategy::StrategyRun;
use super::vision_extractor::{DEFAULT_VISION_INSTRUCTION, VisionExtractor};

/// Characters of OCR output embedded in the vision prompt.
pub const OCR_CONTEXT_CHARS: usize = 2000;

pub const OCR_ONLY_NOTE: &str =
    "[Note: advanced vision analysis failed; the text below is raw OCR output only.]";

const OCR_UNAVAILABLE_NOTE: &str =
    "No OCR text is available for this document. Read everything directly from the image.";

/// OCR first for cheap grounding text, then the vision model on the original
/// document with that text as context.
pub struct HybridOrchestrator {
    chunker: Arc<ChunkOrchestrator>,
    vision: Arc<VisionExtractor>,
}

impl HybridOrchestrator {
    pub fn new(chunker: Arc<ChunkOrchestrator>, vision: Arc<VisionExtractor>) -> Self {
        Self { chunker, vision }
    }

    #[tracing::instrument(
        skip(self, buffer, ctx),
        fields(
            document_id = %buffer.id.as_uuid(),
            filename = %buffer.filename
        )
    )]
    pub async fn extract(&self, buffer: &DocumentBuffer, ctx: &ExtractionContext) -> StrategyRun {
        let ocr = match self.chunker.process(buffer, ctx).await {
            Ok(ocr) => ocr,
            Err(e) => return StrategyRun::failed(e, 0, Vec::new()),
        };

        let page_count = ocr.page_count;
        let mut details = ocr.details();
        if let Some(e) = &ocr.error {
            details.push(ProcessingDetail::failure("ocr", e));
        }

        let ocr_context = Some(ocr.text.as_str())
            .filter(|_| ocr.success)
            .filter(|text| meets_min_text_len(text, ExtractionMethod::Hybrid));

        tracing::info!(
            ocr_success = ocr.success,
            ocr_chars = ocr.text.len(),
            has_context = ocr_context.is_some(),
            "OCR stage finished, starting vision stage"
        );

        if let Err(e) = ctx.ensure_active("vision stage") {
            return StrategyRun::failed(e, page_count, details);
        }

        let prompt = build_vision_prompt(ocr_context);
        let vision_error = match self.vision.extract_text(buffer, &prompt, ctx).await {
            Ok(output) => {
                details.extend(output.details());
                return StrategyRun::succeeded(
                    output.text,
                    ExtractionMethod::Hybrid,
                    page_count,
                    details,
                );
            }
            Err(e) => e,
        };

        details.push(ProcessingDetail::failure("vision", &vision_error));

        if matches!(vision_error, ExtractionError::Cancelled(_)) {
            return StrategyRun::failed(vision_error, page_count, details);
        }

        if let Some(text) = ocr_context {
            tracing::warn!(error = %vision_error, "Vision stage failed, returning OCR text");
            details.push(ProcessingDetail::note(
                "vision stage failed; result contains OCR text only",
            ));
            return StrategyRun::succeeded(
                format!("{OCR_ONLY_NOTE}\n\n{text}"),
                ExtractionMethod::Fallback,
                page_count,
                details,
            );
        }

        let error = more_informative(ocr.error, vision_error);
        tracing::warn!(error = %error, "Both hybrid stages failed");
        StrategyRun::failed(error, page_count, details)
    }
}

/// Vision instruction grounded with the first [`OCR_CONTEXT_CHARS`]
/// characters of OCR output, or a note that no OCR text is available.
pub fn build_vision_prompt(ocr_text: Option<&str>) -> String {
    let context = match ocr_text {
        Some(text) => {
            let excerpt: String = text.chars().take(OCR_CONTEXT_CHARS).collect();
            let truncated = text.chars().count() > OCR_CONTEXT_CHARS;
            format!(
                "OCR text extracted from this document{}. Use it to check your reading, \
but trust the image where they disagree:\n<ocr>\n{excerpt}\n</ocr>",
                if truncated { " (truncated)" } else { "" }
            )
        }
        None => OCR_UNAVAILABLE_NOTE.to_string(),
    };

    format!("{DEFAULT_VISION_INSTRUCTION}\n\n{context}")
}

/// Picks the error that says more about why extraction failed: a specific
/// failure wins over a bare `NoTextExtracted`, otherwise the vision error.
fn more_informative(
    ocr_error: Option<ExtractionError>,
    vision_error: ExtractionError,
) -> ExtractionError {
    match ocr_error {
        Some(ocr_error) if vision_error.is_generic() && !ocr_error.is_generic() => ocr_error,
        _ => vision_error,
    }
}
