//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path of the token refresh endpoint, relative to the API origin.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Refresh request timeout in seconds.
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_seconds: u64,
    /// Whether the server rotates refresh tokens on every refresh.
    ///
    /// A rotated token returned by the server is installed either way;
    /// this flag only controls whether a *missing* rotation is logged as
    /// unexpected.
    #[serde(default)]
    pub refresh_rotation: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: default_refresh_path(),
            refresh_timeout_seconds: default_refresh_timeout(),
            refresh_rotation: false,
        }
    }
}

fn default_refresh_path() -> String {
    "/auth/jwt/refresh/".to_string()
}

fn default_refresh_timeout() -> u64 {
    15
}
