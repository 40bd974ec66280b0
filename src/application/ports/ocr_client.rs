use async_trait::async_trait;

use crate::domain::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub struct OcrResponse {
    pub text: String,
    pub page_count: u32,
}

#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn analyze(
        &self,
        data: &[u8],
        mime: &str,
        model: &str,
    ) -> Result<OcrResponse, ServiceError>;
}
