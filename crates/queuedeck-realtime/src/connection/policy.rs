//! Reconnect timing policy.

use std::time::Duration;

use rand::RngExt;

use queuedeck_core::config::realtime::RealtimeConfig;

/// Bounds and spacing for automatic reconnect attempts.
///
/// Default mode is exponential backoff with uniform jitter; a fixed-delay
/// mode is kept behind configuration for servers that prefer predictable
/// retry traffic.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Attempt cap before the connection goes dormant.
    pub max_attempts: u32,
    /// Base delay.
    base: Duration,
    /// Whether the delay doubles per consecutive failure.
    backoff: bool,
    /// Cap on the computed delay, before jitter.
    max_delay: Duration,
    /// Maximum uniform jitter added to every delay.
    jitter: Duration,
}

impl ReconnectPolicy {
    /// Builds the policy from realtime configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            base: Duration::from_millis(config.reconnect_delay_ms),
            backoff: config.backoff,
            max_delay: Duration::from_millis(config.max_reconnect_delay_ms),
            jitter: Duration::from_millis(config.reconnect_jitter_ms),
        }
    }

    /// Delay before the given attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = if self.backoff {
            // Clamp the shift so a large attempt count cannot overflow.
            let shift = attempt.saturating_sub(1).min(16);
            self.base
                .saturating_mul(2u32.saturating_pow(shift))
                .min(self.max_delay)
        } else {
            self.base
        };

        if self.jitter.is_zero() {
            base
        } else {
            let jitter_ms = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
            base + Duration::from_millis(jitter_ms)
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}
