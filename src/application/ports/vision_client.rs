use async_trait::async_trait;

use crate::domain::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    pub data: Vec<u8>,
    pub mime: String,
    pub instruction: String,
    pub model: String,
    pub max_tokens: u32,
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn complete(&self, request: &VisionRequest) -> Result<String, ServiceError>;
}
