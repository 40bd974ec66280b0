use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::Sleeper;

/// [`Sleeper`] backed by the tokio timer, so paused test clocks apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
