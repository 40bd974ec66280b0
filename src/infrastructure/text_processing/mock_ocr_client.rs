use async_trait::async_trait;

use crate::application::ports::{OcrClient, OcrResponse, ServiceError};

/// Offline OCR stand-in used when no OCR provider is configured.
pub struct MockOcrClient;

#[async_trait]
impl OcrClient for MockOcrClient {
    async fn analyze(
        &self,
        data: &[u8],
        mime: &str,
        model: &str,
    ) -> Result<OcrResponse, ServiceError> {
        Ok(OcrResponse {
            text: format!(
                "Mock OCR transcript ({model}) of a {} byte {mime} inspection report.",
                data.len()
            ),
            page_count: 1,
        })
    }
}
