use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{ServiceError, VisionClient, VisionRequest};
use crate::infrastructure::observability::sanitize_for_log;

/// Vision-language model behind an OpenAI-compatible chat completions API.
///
/// Images go out as `image_url` parts and PDFs as `file` parts, both as
/// base64 data URIs.
pub struct OpenAiVisionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiVisionClient {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request_body(request: &VisionRequest) -> serde_json::Value {
        let b64 = general_purpose::STANDARD.encode(&request.data);
        let data_uri = format!("data:{};base64,{b64}", request.mime);

        let document_part = if request.mime == "application/pdf" {
            serde_json::json!({
                "type": "file",
                "file": { "filename": "document.pdf", "file_data": data_uri }
            })
        } else {
            serde_json::json!({
                "type": "image_url",
                "image_url": { "url": data_uri, "detail": "high" }
            })
        };

        serde_json::json!({
            "model": request.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        document_part,
                        { "type": "text", "text": request.instruction }
                    ]
                }
            ],
            "max_tokens": request.max_tokens,
            "temperature": 0.0,
            "stream": false
        })
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    #[tracing::instrument(
        skip(self, request),
        fields(model = %request.model, mime = %request.mime, bytes = request.data.len())
    )]
    async fn complete(&self, request: &VisionRequest) -> Result<String, ServiceError> {
        tracing::debug!(
            instruction = %sanitize_for_log(&request.instruction),
            "Sending vision completion request"
        );

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(format!("vision request timed out: {e}"))
                } else {
                    ServiceError::RequestFailed(format!("vision request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status, &text));
        }

        let raw_bytes = response.bytes().await.map_err(|e| {
            ServiceError::RequestFailed(format!("vision response read error: {e}"))
        })?;

        let completion: ChatCompletion = serde_json::from_slice(&raw_bytes).map_err(|e| {
            let raw_text = String::from_utf8_lossy(&raw_bytes);
            tracing::error!(
                raw_response = %sanitize_for_log(&raw_text),
                "Failed to parse vision completion JSON"
            );
            ServiceError::InvalidResponse(format!("vision JSON parse error: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        tracing::debug!(chars = content.len(), "Vision completion received");
        Ok(content)
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
