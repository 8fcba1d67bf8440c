//! Real-time connection configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum automatic reconnect attempts before the connection goes
    /// dormant. A fresh `connect` call resets the counter.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Base reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Whether the delay doubles on every consecutive failure. When
    /// disabled, every attempt waits the base delay.
    #[serde(default = "default_true")]
    pub backoff: bool,
    /// Cap on the backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_reconnect_delay_ms: u64,
    /// Maximum uniform jitter added to every delay, in milliseconds.
    #[serde(default = "default_jitter")]
    pub reconnect_jitter_ms: u64,
    /// Transport dial timeout in seconds; expiry is treated the same as a
    /// transport error.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay(),
            backoff: true,
            max_reconnect_delay_ms: default_max_delay(),
            reconnect_jitter_ms: default_jitter(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_reconnect_delay() -> u64 {
    3000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_jitter() -> u64 {
    500
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
