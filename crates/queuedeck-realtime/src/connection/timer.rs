//! Injectable reconnect timer.

use std::time::Duration;

use async_trait::async_trait;

/// Seam over reconnect waits so attempt-count invariants are testable
/// without real timers.
#[async_trait]
pub trait RetryTimer: Send + Sync + std::fmt::Debug + 'static {
    /// Waits for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production timer backed by the tokio clock.
#[derive(Debug, Default, Clone)]
pub struct TokioTimer;

#[async_trait]
impl RetryTimer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
