use std::sync::Arc;

use crate::application::ports::{OcrClient, Sleeper, VisionClient};
use crate::application::services::{
    ChunkOrchestrator, ExtractionPipeline, FileTypeDetector, OcrExtractor, VisionExtractor,
};
use crate::domain::ExtractionError;
use crate::infrastructure::runtime::TokioSleeper;
use crate::presentation::config::{
    ExtractionSettings, ExtractorProvider, OcrSettings, VisionSettings,
};

use super::azure_doc_intel_client::AzureDocIntelClient;
use super::image_payload_compressor::ImagePayloadCompressor;
use super::lopdf_page_splitter::LopdfPageSplitter;
use super::mock_ocr_client::MockOcrClient;
use super::mock_vision_client::MockVisionClient;
use super::openai_vision_client::OpenAiVisionClient;

#[derive(Debug, thiserror::Error)]
pub enum ExtractorFactoryError {
    #[error("ocr.endpoint is required for the Azure Document Intelligence provider")]
    MissingAzureEndpoint,
    #[error("ocr.api_key is required for the Azure Document Intelligence provider")]
    MissingAzureKey,
    #[error("vision.base_url is required for the OpenAI-compatible provider")]
    MissingVisionBaseUrl,
    #[error("vision.api_key is required for the OpenAI-compatible provider")]
    MissingVisionApiKey,
    #[error("provider {provider:?} cannot serve {stage} extraction")]
    UnsupportedProvider {
        stage: &'static str,
        provider: ExtractorProvider,
    },
}

impl From<ExtractorFactoryError> for ExtractionError {
    fn from(error: ExtractorFactoryError) -> Self {
        match error {
            ExtractorFactoryError::UnsupportedProvider { .. } => {
                ExtractionError::ExtractorNotFound(error.to_string())
            }
            _ => ExtractionError::MissingCredentials(error.to_string()),
        }
    }
}

pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn create_ocr_client(
        settings: &OcrSettings,
    ) -> Result<Arc<dyn OcrClient>, ExtractorFactoryError> {
        match settings.provider {
            ExtractorProvider::Azure => {
                let endpoint = non_empty(settings.endpoint.as_deref())
                    .ok_or(ExtractorFactoryError::MissingAzureEndpoint)?;
                let key = non_empty(settings.api_key.as_deref())
                    .ok_or(ExtractorFactoryError::MissingAzureKey)?;
                tracing::info!(
                    endpoint,
                    model = %settings.model,
                    "Using Azure Document Intelligence OCR"
                );
                Ok(Arc::new(AzureDocIntelClient::new(endpoint, key)))
            }
            ExtractorProvider::Mock => {
                tracing::warn!("Using mock OCR client");
                Ok(Arc::new(MockOcrClient))
            }
            provider => Err(ExtractorFactoryError::UnsupportedProvider {
                stage: "ocr",
                provider,
            }),
        }
    }

    pub fn create_vision_client(
        settings: &VisionSettings,
    ) -> Result<Arc<dyn VisionClient>, ExtractorFactoryError> {
        match settings.provider {
            ExtractorProvider::OpenAi => {
                let base_url = non_empty(settings.base_url.as_deref())
                    .ok_or(ExtractorFactoryError::MissingVisionBaseUrl)?;
                let api_key = non_empty(settings.api_key.as_deref())
                    .ok_or(ExtractorFactoryError::MissingVisionApiKey)?;
                tracing::info!(
                    base_url,
                    model = %settings.model,
                    "Using OpenAI-compatible vision model"
                );
                Ok(Arc::new(OpenAiVisionClient::new(base_url, api_key)))
            }
            ExtractorProvider::Mock => {
                tracing::warn!("Using mock vision client");
                Ok(Arc::new(MockVisionClient))
            }
            provider => Err(ExtractorFactoryError::UnsupportedProvider {
                stage: "vision",
                provider,
            }),
        }
    }

    /// Wires the full pipeline from settings with the production adapters.
    pub fn create_pipeline(
        settings: &ExtractionSettings,
    ) -> Result<ExtractionPipeline, ExtractorFactoryError> {
        let ocr_client = Self::create_ocr_client(&settings.ocr)?;
        let vision_client = Self::create_vision_client(&settings.vision)?;
        Ok(Self::assemble(settings, ocr_client, vision_client))
    }

    /// Builds a pipeline around caller-supplied clients.
    pub fn assemble(
        settings: &ExtractionSettings,
        ocr_client: Arc<dyn OcrClient>,
        vision_client: Arc<dyn VisionClient>,
    ) -> ExtractionPipeline {
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

        let ocr = Arc::new(OcrExtractor::new(
            ocr_client,
            Arc::clone(&sleeper),
            settings.ocr.extractor_config(),
        ));
        let chunker = Arc::new(ChunkOrchestrator::new(
            ocr,
            Arc::new(LopdfPageSplitter::new()),
            Arc::clone(&sleeper),
            settings.chunking_policy(),
        ));
        let vision = Arc::new(VisionExtractor::new(
            vision_client,
            Arc::new(ImagePayloadCompressor::default()),
            sleeper,
            settings.vision.extractor_config(),
        ));
        let detector =
            FileTypeDetector::new(settings.min_file_size_bytes, settings.max_file_size_bytes());

        ExtractionPipeline::new(detector, chunker, vision)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
