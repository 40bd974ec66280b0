use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::{
    DocumentBuffer, DocumentMetadata, ExtractionError, ExtractionMethod, ExtractionResult,
    ProcessingDetail, SupportedFileType,
};

use super::chunk_orchestrator::ChunkOrchestrator;
use super::extraction_context::{CancellationSignal, DEFAULT_ATTEMPT_TIMEOUT, ExtractionContext};
use super::file_type_detector::FileTypeDetector;
use super::hybrid_orchestrator::HybridOrchestrator;
use super::ocr_extractor::elapsed_ms;
use super::strategy::StrategyRun;
use super::vision_extractor::{DEFAULT_VISION_INSTRUCTION, VisionExtractor, estimate_page_count};

pub const OCR_COST_PER_PAGE_USD: f64 = 0.0015;
pub const VISION_COST_PER_PAGE_USD: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub preferred_method: ExtractionMethod,
    pub fallback_enabled: bool,
    /// Deadline for each individual call to an external service.
    pub timeout: Duration,
    pub cancel: CancellationSignal,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            preferred_method: ExtractionMethod::Hybrid,
            fallback_enabled: true,
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
            cancel: CancellationSignal::new(),
        }
    }
}

/// Entry point: validates a document, runs the primary strategy, and falls
/// back to vision-only extraction when the primary one fails.
///
/// `process` never returns an error; every failure ends up in
/// [`ExtractionResult::error`].
pub struct ExtractionPipeline {
    detector: FileTypeDetector,
    chunker: Arc<ChunkOrchestrator>,
    vision: Arc<VisionExtractor>,
    hybrid: HybridOrchestrator,
}

impl ExtractionPipeline {
    pub fn new(
        detector: FileTypeDetector,
        chunker: Arc<ChunkOrchestrator>,
        vision: Arc<VisionExtractor>,
    ) -> Self {
        let hybrid = HybridOrchestrator::new(Arc::clone(&chunker), Arc::clone(&vision));
        Self {
            detector,
            chunker,
            vision,
            hybrid,
        }
    }

    /// Primary strategy and, if different, the fallback strategy.
    pub fn select_strategy(
        file_type: SupportedFileType,
        preferred: ExtractionMethod,
    ) -> (ExtractionMethod, Option<ExtractionMethod>) {
        let primary = match preferred {
            ExtractionMethod::Hybrid | ExtractionMethod::Fallback if file_type.is_supported() => {
                ExtractionMethod::Hybrid
            }
            ExtractionMethod::Hybrid | ExtractionMethod::Fallback => ExtractionMethod::Vision,
            other => other,
        };

        let fallback = ExtractionMethod::Vision;
        (primary, (primary != fallback).then_some(fallback))
    }

    #[tracing::instrument(
        skip(self, buffer, options),
        fields(
            document_id = %buffer.id.as_uuid(),
            filename = %buffer.filename,
            size_bytes = buffer.size_bytes
        )
    )]
    pub async fn process(
        &self,
        buffer: &DocumentBuffer,
        options: ProcessOptions,
    ) -> ExtractionResult {
        let started = Instant::now();
        let mut metadata = DocumentMetadata::new(buffer.file_type, options.preferred_method);

        let report = self
            .detector
            .validate(buffer.as_bytes(), &buffer.filename, buffer.size_bytes);
        metadata.file_type = report.file_type;
        if !report.is_valid {
            let error = ExtractionError::UnsupportedFileType(report.errors.join("; "));
            metadata
                .processing_details
                .push(ProcessingDetail::failure("validation", &error));
            return ExtractionResult::failed(
                error.to_string(),
                options.preferred_method,
                metadata,
                elapsed_ms(started),
            );
        }

        let ctx = ExtractionContext::new(options.timeout, options.cancel.clone());
        let (primary, fallback) = Self::select_strategy(report.file_type, options.preferred_method);
        tracing::info!(
            file_type = %report.file_type,
            primary = %primary,
            fallback = ?fallback,
            "Starting document extraction"
        );

        let primary_run = self.run_strategy(primary, buffer, &ctx).await;
        metadata.page_count = primary_run.page_count;
        metadata.processing_details.extend(primary_run.details);

        let primary_error = match primary_run.outcome {
            Ok(extracted) => {
                return self.finish(extracted.text, extracted.method, metadata, started);
            }
            Err(e) => e,
        };

        let fallback = fallback.filter(|_| options.fallback_enabled && !primary_error.is_fatal());
        let Some(fallback) = fallback else {
            return self.fail(primary, primary_error, metadata, started);
        };

        tracing::warn!(
            primary = %primary,
            fallback = %fallback,
            error = %primary_error,
            "Primary strategy failed, trying fallback"
        );
        metadata.processing_details.push(ProcessingDetail::note(format!(
            "{primary} strategy failed, fell back to {fallback}"
        )));

        if let Err(e) = ctx.ensure_active("fallback strategy") {
            return self.fail(fallback, e, metadata, started);
        }

        let fallback_run = self.run_strategy(fallback, buffer, &ctx).await;
        if metadata.page_count == 0 {
            metadata.page_count = fallback_run.page_count;
        }
        metadata.processing_details.extend(fallback_run.details);

        match fallback_run.outcome {
            Ok(extracted) => self.finish(extracted.text, extracted.method, metadata, started),
            Err(e) if e.is_fatal() => self.fail(fallback, e, metadata, started),
            Err(e) => self.fail(
                fallback,
                ExtractionError::NoTextExtracted(format!(
                    "{primary} strategy failed ({primary_error}); {fallback} fallback failed ({e})"
                )),
                metadata,
                started,
            ),
        }
    }

    async fn run_strategy(
        &self,
        method: ExtractionMethod,
        buffer: &DocumentBuffer,
        ctx: &ExtractionContext,
    ) -> StrategyRun {
        match method {
            ExtractionMethod::Hybrid | ExtractionMethod::Fallback => {
                self.hybrid.extract(buffer, ctx).await
            }
            ExtractionMethod::Ocr => match self.chunker.process(buffer, ctx).await {
                Ok(ocr) => {
                    let details = ocr.details();
                    match (ocr.success, ocr.error) {
                        (true, _) => StrategyRun::succeeded(
                            ocr.text,
                            ExtractionMethod::Ocr,
                            ocr.page_count,
                            details,
                        ),
                        (false, error) => StrategyRun::failed(
                            error.unwrap_or_else(|| {
                                ExtractionError::NoTextExtracted("OCR produced no text".to_string())
                            }),
                            ocr.page_count,
                            details,
                        ),
                    }
                }
                Err(e) => StrategyRun::failed(e, 0, Vec::new()),
            },
            ExtractionMethod::Vision => {
                let page_count = estimate_page_count(buffer);
                if let Err(e) = ctx.ensure_active("vision extraction") {
                    return StrategyRun::failed(e, page_count, Vec::new());
                }
                match self
                    .vision
                    .extract_text(buffer, DEFAULT_VISION_INSTRUCTION, ctx)
                    .await
                {
                    Ok(output) => {
                        let details = output.details();
                        StrategyRun::succeeded(
                            output.text,
                            ExtractionMethod::Vision,
                            page_count,
                            details,
                        )
                    }
                    Err(e) => {
                        let details = vec![ProcessingDetail::failure("vision", &e)];
                        StrategyRun::failed(e, page_count, details)
                    }
                }
            }
        }
    }

    fn finish(
        &self,
        text: String,
        method: ExtractionMethod,
        mut metadata: DocumentMetadata,
        started: Instant,
    ) -> ExtractionResult {
        metadata
            .processing_details
            .push(cost_estimate(method, metadata.page_count));
        let result = ExtractionResult::succeeded(text, method, metadata, elapsed_ms(started));
        tracing::info!(
            method = %result.method,
            success = result.success,
            chars = result.extracted_text.len(),
            processing_time_ms = result.processing_time_ms,
            "Document extraction finished"
        );
        result
    }

    fn fail(
        &self,
        method: ExtractionMethod,
        error: ExtractionError,
        metadata: DocumentMetadata,
        started: Instant,
    ) -> ExtractionResult {
        let result =
            ExtractionResult::failed(error.to_string(), method, metadata, elapsed_ms(started));
        tracing::error!(
            method = %method,
            error = %error,
            processing_time_ms = result.processing_time_ms,
            "Document extraction failed"
        );
        result
    }
}

pub fn cost_estimate(method: ExtractionMethod, pages: u32) -> ProcessingDetail {
    let per_page = match method {
        ExtractionMethod::Ocr => OCR_COST_PER_PAGE_USD,
        ExtractionMethod::Vision => VISION_COST_PER_PAGE_USD,
        ExtractionMethod::Hybrid | ExtractionMethod::Fallback => {
            OCR_COST_PER_PAGE_USD + VISION_COST_PER_PAGE_USD
        }
    };

    ProcessingDetail::CostEstimate {
        method,
        pages,
        estimated_usd: f64::from(pages.max(1)) * per_page,
    }
}
