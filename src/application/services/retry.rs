use std::future::Future;
use std::time::Duration;

use crate::application::ports::Sleeper;
use crate::domain::ExtractionError;

pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(1_000);
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(5_000);

/// Tuning shared by the OCR and vision extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Additional attempts after the first one.
    pub retries: u32,
    pub model: String,
    pub max_tokens: u32,
}

impl ExtractorConfig {
    pub fn new(retries: u32, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            retries,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.retries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            base_delay: BASE_RETRY_DELAY,
            max_delay: MAX_RETRY_DELAY,
        }
    }

    /// Delay to wait after attempt `attempt` (1-indexed) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts.
///
/// Each attempt is raced against `attempt_timeout`. An attempt that loses the
/// race is abandoned and counts as a retryable `ExtractionTimeout`.
pub async fn run_with_retry<T, F, Fut>(
    stage: &str,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<Attempted<T>, ExtractionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ExtractionError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = tokio::time::timeout(attempt_timeout, operation(attempt))
            .await
            .unwrap_or(Err(ExtractionError::ExtractionTimeout(attempt_timeout)));

        let error = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(stage, attempt, "Extraction attempt succeeded after retry");
                }
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                });
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            tracing::warn!(stage, attempt, error = %error, "Non-retryable extraction failure");
            return Err(error);
        }

        if attempt >= policy.max_attempts {
            tracing::warn!(
                stage,
                attempts = attempt,
                error = %error,
                "Extraction retries exhausted"
            );
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            stage,
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Extraction attempt failed, retrying"
        );
        sleeper.sleep(delay).await;
    }
}
