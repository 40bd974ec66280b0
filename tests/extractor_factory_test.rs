mod helpers;

use reportscan::application::services::ProcessOptions;
use reportscan::domain::{DocumentBuffer, ExtractionError, ExtractionMethod};
use reportscan::infrastructure::text_processing::{ExtractorFactory, ExtractorFactoryError};
use reportscan::presentation::config::{
    ExtractionSettings, ExtractorProvider, OcrSettings, VisionSettings,
};

use helpers::fake_pdf;

fn mock_settings() -> ExtractionSettings {
    ExtractionSettings {
        inter_chunk_delay_ms: 0,
        ocr: OcrSettings {
            provider: ExtractorProvider::Mock,
            ..OcrSettings::default()
        },
        vision: VisionSettings {
            provider: ExtractorProvider::Mock,
            ..VisionSettings::default()
        },
        ..ExtractionSettings::default()
    }
}

#[test]
fn given_azure_without_endpoint_when_creating_ocr_client_then_fails() {
    let settings = OcrSettings {
        api_key: Some("key".to_string()),
        ..OcrSettings::default()
    };

    let result = ExtractorFactory::create_ocr_client(&settings);

    assert!(matches!(result, Err(ExtractorFactoryError::MissingAzureEndpoint)));
}

#[test]
fn given_azure_with_blank_key_when_creating_ocr_client_then_fails() {
    let settings = OcrSettings {
        endpoint: Some("https://example.cognitiveservices.azure.com".to_string()),
        api_key: Some("   ".to_string()),
        ..OcrSettings::default()
    };

    let result = ExtractorFactory::create_ocr_client(&settings);

    assert!(matches!(result, Err(ExtractorFactoryError::MissingAzureKey)));
}

#[test]
fn given_openai_without_api_key_when_creating_vision_client_then_fails() {
    let result = ExtractorFactory::create_vision_client(&VisionSettings::default());

    assert!(matches!(result, Err(ExtractorFactoryError::MissingVisionApiKey)));
}

#[test]
fn given_configured_providers_when_creating_clients_then_succeeds() {
    let ocr = OcrSettings {
        endpoint: Some("https://example.cognitiveservices.azure.com/".to_string()),
        api_key: Some("key".to_string()),
        ..OcrSettings::default()
    };
    let vision = VisionSettings {
        api_key: Some("sk-test".to_string()),
        ..VisionSettings::default()
    };

    assert!(ExtractorFactory::create_ocr_client(&ocr).is_ok());
    assert!(ExtractorFactory::create_vision_client(&vision).is_ok());
}

#[test]
fn given_provider_for_wrong_stage_when_creating_client_then_reports_unsupported() {
    let settings = OcrSettings {
        provider: ExtractorProvider::OpenAi,
        ..OcrSettings::default()
    };

    let error = ExtractorFactory::create_ocr_client(&settings).err().unwrap();

    assert!(matches!(
        error,
        ExtractorFactoryError::UnsupportedProvider { stage: "ocr", .. }
    ));
    assert!(matches!(
        ExtractionError::from(error),
        ExtractionError::ExtractorNotFound(_)
    ));
}

#[test]
fn given_missing_credentials_when_converting_then_maps_to_missing_credentials() {
    let error = ExtractionError::from(ExtractorFactoryError::MissingAzureKey);

    assert!(matches!(error, ExtractionError::MissingCredentials(_)));
    assert!(error.is_fatal());
}

#[tokio::test]
async fn given_mock_providers_when_creating_pipeline_then_processes_documents() {
    let settings = mock_settings();
    let pipeline = ExtractorFactory::create_pipeline(&settings).unwrap();
    let buffer = DocumentBuffer::new(fake_pdf(2), "report.pdf");

    let result = pipeline.process(&buffer, settings.process_options()).await;

    assert!(result.success);
    assert_eq!(result.method, ExtractionMethod::Hybrid);
    assert!(result.extracted_text.starts_with("Mock vision transcript"));
}

#[tokio::test]
async fn given_mock_providers_and_ocr_preference_when_processing_then_uses_mock_ocr() {
    let pipeline = ExtractorFactory::create_pipeline(&mock_settings()).unwrap();
    let buffer = DocumentBuffer::new(fake_pdf(2), "report.pdf");
    let options = ProcessOptions {
        preferred_method: ExtractionMethod::Ocr,
        ..ProcessOptions::default()
    };

    let result = pipeline.process(&buffer, options).await;

    assert!(result.success);
    assert!(result.extracted_text.starts_with("Mock OCR transcript"));
}
