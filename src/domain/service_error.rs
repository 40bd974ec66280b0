/// Failure reported by an external OCR or vision service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("api request failed: {0}")]
    RequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("page limit exceeded: {0}")]
    PageLimitExceeded(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service timed out: {0}")]
    Timeout(String),
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::PageLimitExceeded(_)
                | Self::InvalidArgument(_)
                | Self::PermissionDenied(_)
                | Self::NotFound(_)
        )
    }

    /// Maps an HTTP status and response body onto an error kind.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = format!("status {status}: {body}");
        match status {
            400 | 413 if mentions_page_limit(body) => Self::PageLimitExceeded(detail),
            400 | 422 => Self::InvalidArgument(detail),
            401 | 403 => Self::PermissionDenied(detail),
            404 => Self::NotFound(detail),
            408 | 504 => Self::Timeout(detail),
            429 => Self::RateLimited,
            _ => Self::RequestFailed(detail),
        }
    }
}

fn mentions_page_limit(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("page limit") || lower.contains("too many pages") || lower.contains("pagelimit")
}
