use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{PayloadCompressor, Sleeper, VisionClient, VisionRequest};
use crate::domain::{
    DocumentBuffer, DocumentMetadata, ExtractionError, ExtractionMethod, ExtractionResult,
    ProcessingDetail, meets_min_text_len,
};

use super::extraction_context::ExtractionContext;
use super::ocr_extractor::elapsed_ms;
use super::page_counter::PageCounter;
use super::retry::{ExtractorConfig, run_with_retry};

pub const VISION_PAYLOAD_LIMIT_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_VISION_INSTRUCTION: &str = "You are transcribing a property inspection report. \
Extract ALL text from this document exactly as written, page by page, in reading order.\n\
\n\
Rules:\n\
1. Keep section headings, item numbers, and checklist labels.\n\
2. Transcribe tables row by row, separating cells with ' | '.\n\
3. For photos or diagrams, write one short line in square brackets describing what they show.\n\
4. Do not summarize, interpret, or add commentary. Output only the transcription.";

#[derive(Debug, Clone, PartialEq)]
pub struct VisionOutput {
    pub text: String,
    pub attempts: u32,
    pub original_bytes: usize,
    pub payload_bytes: usize,
}

impl VisionOutput {
    pub fn details(&self) -> Vec<ProcessingDetail> {
        let mut details = vec![ProcessingDetail::Attempts {
            stage: "vision".to_string(),
            attempts: self.attempts,
        }];
        if self.payload_bytes != self.original_bytes {
            details.push(ProcessingDetail::Compression {
                original_bytes: self.original_bytes,
                compressed_bytes: self.payload_bytes,
            });
        }
        details
    }
}

/// Retrying front for a [`VisionClient`] that keeps uploads under the
/// service's payload ceiling.
pub struct VisionExtractor {
    client: Arc<dyn VisionClient>,
    compressor: Arc<dyn PayloadCompressor>,
    sleeper: Arc<dyn Sleeper>,
    config: ExtractorConfig,
    payload_limit: usize,
}

impl VisionExtractor {
    pub fn new(
        client: Arc<dyn VisionClient>,
        compressor: Arc<dyn PayloadCompressor>,
        sleeper: Arc<dyn Sleeper>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            client,
            compressor,
            sleeper,
            config,
            payload_limit: VISION_PAYLOAD_LIMIT_BYTES,
        }
    }

    pub fn with_payload_limit(mut self, payload_limit: usize) -> Self {
        self.payload_limit = payload_limit;
        self
    }

    pub async fn extract_text(
        &self,
        buffer: &DocumentBuffer,
        instruction: &str,
        ctx: &ExtractionContext,
    ) -> Result<VisionOutput, ExtractionError> {
        if !buffer.file_type.is_supported() {
            return Err(ExtractionError::UnsupportedFileType(
                "vision extraction accepts PDF, JPEG, or PNG input".to_string(),
            ));
        }

        let request = self.build_request(buffer, instruction)?;
        let payload_bytes = request.data.len();

        let attempted = run_with_retry(
            "vision",
            self.config.retry_policy(),
            ctx.attempt_timeout,
            self.sleeper.as_ref(),
            |attempt| {
                let request = &request;
                async move {
                    tracing::debug!(
                        attempt,
                        bytes = payload_bytes,
                        "Sending document to vision model"
                    );
                    let text = self.client.complete(request).await?;

                    if !meets_min_text_len(&text, ExtractionMethod::Vision) {
                        return Err(ExtractionError::NoTextExtracted(format!(
                            "vision model returned {} characters, minimum is {}",
                            text.trim().chars().count(),
                            ExtractionMethod::Vision.min_text_len()
                        )));
                    }

                    Ok(text)
                }
            },
        )
        .await?;

        Ok(VisionOutput {
            text: attempted.value,
            attempts: attempted.attempts,
            original_bytes: buffer.data.len(),
            payload_bytes,
        })
    }

    #[tracing::instrument(
        skip(self, buffer, ctx),
        fields(
            document_id = %buffer.id.as_uuid(),
            filename = %buffer.filename
        )
    )]
    pub async fn extract(
        &self,
        buffer: &DocumentBuffer,
        ctx: &ExtractionContext,
    ) -> ExtractionResult {
        let started = Instant::now();
        let mut metadata = DocumentMetadata::new(buffer.file_type, ExtractionMethod::Vision);
        metadata.page_count = estimate_page_count(buffer);

        match self
            .extract_text(buffer, DEFAULT_VISION_INSTRUCTION, ctx)
            .await
        {
            Ok(output) => {
                metadata.processing_details.extend(output.details());
                ExtractionResult::succeeded(
                    output.text,
                    ExtractionMethod::Vision,
                    metadata,
                    elapsed_ms(started),
                )
            }
            Err(e) => {
                metadata
                    .processing_details
                    .push(ProcessingDetail::failure("vision", &e));
                ExtractionResult::failed(
                    e.to_string(),
                    ExtractionMethod::Vision,
                    metadata,
                    elapsed_ms(started),
                )
            }
        }
    }

    fn build_request(
        &self,
        buffer: &DocumentBuffer,
        instruction: &str,
    ) -> Result<VisionRequest, ExtractionError> {
        let original = buffer.as_bytes();

        let (data, mime) = if original.len() > self.payload_limit {
            let compressed = self
                .compressor
                .compress(original, buffer.file_type, self.payload_limit)
                .map_err(|e| {
                    tracing::warn!(error = %e, "Payload compression failed");
                    ExtractionError::PayloadTooLarge {
                        size: original.len(),
                        limit: self.payload_limit,
                    }
                })?;
            tracing::info!(
                original_bytes = original.len(),
                compressed_bytes = compressed.data.len(),
                "Compressed vision payload"
            );
            (compressed.data, compressed.mime)
        } else {
            (original.to_vec(), buffer.file_type.as_mime().to_string())
        };

        if data.len() > self.payload_limit {
            return Err(ExtractionError::PayloadTooLarge {
                size: data.len(),
                limit: self.payload_limit,
            });
        }

        Ok(VisionRequest {
            data,
            mime,
            instruction: instruction.to_string(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
        })
    }
}

pub(crate) fn estimate_page_count(buffer: &DocumentBuffer) -> u32 {
    if buffer.file_type.is_image() {
        1
    } else {
        PageCounter::new().count_pages(buffer.as_bytes()).page_count
    }
}
