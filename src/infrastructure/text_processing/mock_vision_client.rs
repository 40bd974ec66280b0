use async_trait::async_trait;

use crate::application::ports::{ServiceError, VisionClient, VisionRequest};

pub struct MockVisionClient;

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn complete(&self, request: &VisionRequest) -> Result<String, ServiceError> {
        Ok(format!(
            "Mock vision transcript from {} of a {} byte {} inspection report.",
            request.model,
            request.data.len(),
            request.mime
        ))
    }
}
