//! Token refresh endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use queuedeck_core::config::api::ApiConfig;
use queuedeck_core::config::auth::AuthConfig;
use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;

/// Tokens returned by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// The new access token.
    pub access: String,
    /// A rotated refresh token, when the server issued one.
    pub refresh: Option<String>,
}

/// Seam over the refresh endpoint so the lifecycle manager can be driven
/// by a stub in tests.
#[async_trait]
pub trait TokenRefresher: Send + Sync + std::fmt::Debug + 'static {
    /// Exchanges a refresh token for a new access token.
    ///
    /// Any failure — network, timeout, or server rejection — maps to
    /// [`ErrorKind::RefreshFailed`](queuedeck_core::error::ErrorKind).
    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshedTokens>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// [`TokenRefresher`] backed by `POST {origin}{refresh_path}`.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    /// HTTP client with the configured request timeout applied.
    client: reqwest::Client,
    /// Fully resolved refresh endpoint URL.
    url: String,
    /// Whether the server is expected to rotate refresh tokens.
    expect_rotation: bool,
}

impl HttpTokenRefresher {
    /// Builds a refresher from the API and auth configuration.
    pub fn new(api: &ApiConfig, auth: &AuthConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(auth.refresh_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        let url = format!(
            "{}{}",
            api.origin.trim_end_matches('/'),
            auth.refresh_path
        );
        Ok(Self {
            client,
            url,
            expect_rotation: auth.refresh_rotation,
        })
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshedTokens> {
        let response = self
            .client
            .post(&self.url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    queuedeck_core::error::ErrorKind::RefreshFailed,
                    format!("Refresh request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::refresh_failed(format!(
                "Refresh endpoint returned {status}"
            )));
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            AppError::refresh_failed(format!("Malformed refresh response: {e}"))
        })?;

        if self.expect_rotation && body.refresh.is_none() {
            warn!("Server was expected to rotate the refresh token but did not");
        }

        Ok(RefreshedTokens {
            access: body.access,
            refresh: body.refresh,
        })
    }
}
