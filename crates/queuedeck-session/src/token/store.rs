//! Volatile in-memory credential holder.

use tokio::sync::RwLock;

use queuedeck_core::result::AppResult;

use super::claims::decode_unverified;

/// The current access/refresh credential pair.
///
/// Owned exclusively by [`TokenStore`]; never duplicated elsewhere and
/// never written into the session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token attached to API requests.
    pub access_token: String,
    /// Token exchanged at the refresh endpoint for a new access token.
    pub refresh_token: String,
    /// Expiry of the access token (seconds since epoch), read from its
    /// `exp` claim at construction.
    pub access_expiry: i64,
}

impl Credential {
    /// Builds a credential pair, deriving the expiry from the access
    /// token's `exp` claim. Fails on an undecodable access token.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> AppResult<Self> {
        let access_token = access_token.into();
        let claims = decode_unverified(&access_token)?;
        Ok(Self {
            access_token,
            refresh_token: refresh_token.into(),
            access_expiry: claims.exp,
        })
    }

    /// Whether the access token has expired at the given epoch second.
    pub fn is_expired_at(&self, now_epoch: i64) -> bool {
        now_epoch >= self.access_expiry
    }
}

/// Holds the credential pair in volatile memory.
///
/// Mutated only by the session lifecycle manager and the login/logout
/// entry points. A credential present here has not been confirmed expired
/// by the last check; staleness is tolerated only between checks.
#[derive(Debug, Default)]
pub struct TokenStore {
    /// The current credential, if any.
    credential: RwLock<Option<Credential>>,
}

impl TokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current credential.
    pub async fn get(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Returns the current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    /// Installs a credential, replacing any existing one.
    pub async fn set(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }

    /// Drops the credential. Idempotent.
    pub async fn clear(&self) {
        *self.credential.write().await = None;
    }

    /// Whether no credential is held.
    pub async fn is_empty(&self) -> bool {
        self.credential.read().await.is_none()
    }
}
