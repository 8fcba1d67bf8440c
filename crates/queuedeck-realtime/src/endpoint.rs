//! Real-time endpoint resolution.

use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;

/// Resolves a relative real-time path against the configured backend
/// origin, upgrading the scheme to its WebSocket equivalent.
pub fn resolve(origin: &str, path: &str) -> AppResult<String> {
    let ws_origin = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if origin.starts_with("wss://") || origin.starts_with("ws://") {
        origin.to_string()
    } else {
        return Err(AppError::configuration(format!(
            "Origin '{origin}' has no recognized scheme"
        )));
    };

    let ws_origin = ws_origin.trim_end_matches('/');
    if path.starts_with('/') {
        Ok(format!("{ws_origin}{path}"))
    } else {
        Ok(format!("{ws_origin}/{path}"))
    }
}
