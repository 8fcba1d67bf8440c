//! Backend API configuration.

use serde::{Deserialize, Serialize};

/// Backend API origin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Application-layer origin of the backend, e.g. `https://api.example.com`.
    ///
    /// Real-time endpoints are derived from this origin with the scheme
    /// upgraded to its WebSocket equivalent.
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}
