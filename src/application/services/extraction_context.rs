use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::domain::ExtractionError;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(180_000);

/// Cooperative cancellation flag shared between a caller and one `process()` call.
///
/// The pipeline only looks at it between chunks and between stages; an
/// external request that already started runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal(Arc<AtomicBool>);

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call settings threaded through every stage of one extraction.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub attempt_timeout: Duration,
    pub cancel: CancellationSignal,
}

impl ExtractionContext {
    pub fn new(attempt_timeout: Duration, cancel: CancellationSignal) -> Self {
        Self {
            attempt_timeout,
            cancel,
        }
    }

    pub fn ensure_active(&self, boundary: &str) -> Result<(), ExtractionError> {
        if self.cancel.is_cancelled() {
            tracing::info!(boundary, "Extraction cancelled by caller");
            return Err(ExtractionError::Cancelled(format!(
                "cancelled before {boundary}"
            )));
        }
        Ok(())
    }
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPT_TIMEOUT, CancellationSignal::new())
    }
}
