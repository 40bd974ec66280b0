use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{OcrClient, OcrResponse, ServiceError};

use super::text_sanitizer::sanitize_extracted_text;

pub const POLL_TIMEOUT: Duration = Duration::from_secs(300);
pub const INITIAL_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const API_VERSION: &str = "2024-11-30";
pub const DEFAULT_MODEL: &str = "prebuilt-layout";

/// OCR through Azure AI Document Intelligence: submit the document, then poll
/// the returned operation until analysis completes.
pub struct AzureDocIntelClient {
    client: Client,
    endpoint: String,
    api_key: String,
    poll_interval: Duration,
}

impl AzureDocIntelClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            poll_interval: INITIAL_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn submit(&self, data: &[u8], model: &str) -> Result<String, ServiceError> {
        let b64 = general_purpose::STANDARD.encode(data);
        let body = serde_json::json!({ "base64Source": b64 });

        let url = format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}&outputContentFormat=markdown",
            self.endpoint, model, API_VERSION
        );

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error("Azure submit", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status, &text));
        }

        let operation_url = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::InvalidResponse(
                    "Azure response missing Operation-Location header".to_string(),
                )
            })?
            .to_string();

        Ok(operation_url)
    }

    async fn poll_until_complete(
        &self,
        operation_url: &str,
    ) -> Result<AnalyzeResult, ServiceError> {
        let poll_future = async {
            let mut interval = self.poll_interval;

            loop {
                let response = self
                    .client
                    .get(operation_url)
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
                    .send()
                    .await
                    .map_err(|e| request_error("Azure poll", e))?;

                if response.status().as_u16() == 429 {
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(interval);
                    tracing::debug!(
                        retry_after_ms = retry_after.as_millis() as u64,
                        "Azure poll throttled"
                    );
                    tokio::time::sleep(retry_after).await;
                    continue;
                }

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    return Err(ServiceError::from_status(status, &text));
                }

                let result: AnalyzeResponse = response.json().await.map_err(|e| {
                    ServiceError::InvalidResponse(format!("Azure response parse failed: {e}"))
                })?;

                match result.status.as_str() {
                    "succeeded" => return Ok(result.analyze_result.unwrap_or_default()),
                    "failed" => return Err(failed_operation(result.error)),
                    _ => {
                        tokio::time::sleep(interval).await;
                        interval = (interval * 2).min(MAX_POLL_INTERVAL);
                    }
                }
            }
        };

        tokio::time::timeout(POLL_TIMEOUT, poll_future)
            .await
            .map_err(|_| {
                ServiceError::Timeout(format!(
                    "Azure Document Intelligence polling exceeded {}s",
                    POLL_TIMEOUT.as_secs()
                ))
            })?
    }
}

#[async_trait]
impl OcrClient for AzureDocIntelClient {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn analyze(
        &self,
        data: &[u8],
        mime: &str,
        model: &str,
    ) -> Result<OcrResponse, ServiceError> {
        let operation_url = self.submit(data, model).await?;
        let result = self.poll_until_complete(&operation_url).await?;

        let page_count = result.pages.len() as u32;
        tracing::info!(page_count, chars = result.content.len(), "Azure analysis complete");

        Ok(OcrResponse {
            text: sanitize_extracted_text(&result.content),
            page_count,
        })
    }
}

fn request_error(stage: &str, e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout(format!("{stage} timed out: {e}"))
    } else {
        ServiceError::RequestFailed(format!("{stage} failed: {e}"))
    }
}

fn failed_operation(error: Option<AnalyzeError>) -> ServiceError {
    let Some(error) = error else {
        return ServiceError::RequestFailed(
            "Azure Document Intelligence analysis failed".to_string(),
        );
    };

    let detail = format!("{}: {}", error.code, error.message);
    match error.code.as_str() {
        "InvalidArgument" | "InvalidRequest" | "InvalidContent" => {
            if detail.to_lowercase().contains("page") {
                ServiceError::PageLimitExceeded(detail)
            } else {
                ServiceError::InvalidArgument(detail)
            }
        }
        "Forbidden" | "Unauthorized" | "PermissionDenied" => ServiceError::PermissionDenied(detail),
        "NotFound" | "ModelNotFound" => ServiceError::NotFound(detail),
        _ => ServiceError::RequestFailed(detail),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    #[serde(rename = "analyzeResult")]
    pub analyze_result: Option<AnalyzeResult>,
    pub error: Option<AnalyzeError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pages: Vec<AnalyzedPage>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzedPage {
    #[serde(rename = "pageNumber")]
    pub page_number: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
