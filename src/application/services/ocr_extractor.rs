use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{OcrClient, Sleeper};
use crate::domain::{
    DocumentBuffer, DocumentMetadata, ExtractionError, ExtractionMethod, ExtractionResult,
    ProcessingDetail, SupportedFileType, meets_min_text_len,
};

use super::extraction_context::ExtractionContext;
use super::retry::{ExtractorConfig, run_with_retry};

#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub page_count: u32,
    pub attempts: u32,
}

/// Retrying front for an [`OcrClient`].
pub struct OcrExtractor {
    client: Arc<dyn OcrClient>,
    sleeper: Arc<dyn Sleeper>,
    config: ExtractorConfig,
}

impl OcrExtractor {
    pub fn new(
        client: Arc<dyn OcrClient>,
        sleeper: Arc<dyn Sleeper>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            client,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub async fn extract_text(
        &self,
        data: &[u8],
        file_type: SupportedFileType,
        ctx: &ExtractionContext,
    ) -> Result<OcrOutput, ExtractionError> {
        if !file_type.is_supported() {
            return Err(ExtractionError::UnsupportedFileType(
                "OCR accepts PDF, JPEG, or PNG input".to_string(),
            ));
        }

        let mime = file_type.as_mime();
        let model = self.config.model.as_str();

        let attempted = run_with_retry(
            "ocr",
            self.config.retry_policy(),
            ctx.attempt_timeout,
            self.sleeper.as_ref(),
            |attempt| async move {
                tracing::debug!(
                    attempt,
                    mime,
                    bytes = data.len(),
                    "Submitting document to OCR"
                );
                let response = self.client.analyze(data, mime, model).await?;

                if !meets_min_text_len(&response.text, ExtractionMethod::Ocr) {
                    return Err(ExtractionError::NoTextExtracted(format!(
                        "OCR returned {} characters, minimum is {}",
                        response.text.trim().chars().count(),
                        ExtractionMethod::Ocr.min_text_len()
                    )));
                }

                Ok(response)
            },
        )
        .await?;

        Ok(OcrOutput {
            text: attempted.value.text,
            page_count: attempted.value.page_count,
            attempts: attempted.attempts,
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
        let mut metadata = DocumentMetadata::new(buffer.file_type, ExtractionMethod::Ocr);

        match self.extract_text(buffer.as_bytes(), buffer.file_type, ctx).await {
            Ok(output) => {
                metadata.page_count = output.page_count;
                metadata.processing_details.push(ProcessingDetail::Attempts {
                    stage: "ocr".to_string(),
                    attempts: output.attempts,
                });
                ExtractionResult::succeeded(
                    output.text,
                    ExtractionMethod::Ocr,
                    metadata,
                    elapsed_ms(started),
                )
            }
            Err(e) => {
                metadata.processing_details.push(ProcessingDetail::failure("ocr", &e));
                ExtractionResult::failed(
                    e.to_string(),
                    ExtractionMethod::Ocr,
                    metadata,
                    elapsed_ms(started),
                )
            }
        }
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
