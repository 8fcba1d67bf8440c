//! Startup session reconciliation state machine.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use queuedeck_core::result::AppResult;
use queuedeck_core::traits::DurableStore;
use queuedeck_core::types::{TenantRole, UserProfile};
use queuedeck_storage::keys;

use crate::state::{SessionSnapshot, SessionState};
use crate::token::claims::decode_unverified;
use crate::token::{Credential, TokenStore};

use super::refresh::TokenRefresher;

/// Phase of the one-time startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Process started, nothing read yet.
    Uninitialized,
    /// Durable snapshot being read and merged.
    Hydrating,
    /// Session and stored credentials being reconciled.
    Reconciling,
    /// Terminal for the process; later logins bypass this manager.
    Ready,
}

/// Reconciles restored session state against the stored credential pair
/// once per process lifetime, and owns the login/logout entry points —
/// the only writers of [`TokenStore`] besides itself.
pub struct SessionLifecycleManager {
    /// Session container.
    session: Arc<SessionState>,
    /// Volatile credential holder.
    tokens: Arc<TokenStore>,
    /// Durable storage for credentials and the snapshot.
    store: Arc<dyn DurableStore>,
    /// Refresh endpoint client.
    refresher: Arc<dyn TokenRefresher>,
    /// Current phase.
    phase: RwLock<LifecyclePhase>,
}

impl std::fmt::Debug for SessionLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleManager").finish()
    }
}

impl SessionLifecycleManager {
    /// Creates a manager in the `Uninitialized` phase.
    pub fn new(
        session: Arc<SessionState>,
        tokens: Arc<TokenStore>,
        store: Arc<dyn DurableStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self {
            session,
            tokens,
            store,
            refresher,
            phase: RwLock::new(LifecyclePhase::Uninitialized),
        }
    }

    /// Current phase.
    pub async fn phase(&self) -> LifecyclePhase {
        *self.phase.read().await
    }

    /// Runs the startup sequence: hydrate the session from durable
    /// storage, then reconcile it against the stored credential pair.
    ///
    /// Runs exactly once per process lifetime; later calls are ignored.
    /// Every failure path lands in a clean logged-out `Ready` state,
    /// never a half-authenticated one.
    pub async fn initialize(&self) -> AppResult<()> {
        {
            let mut phase = self.phase.write().await;
            if *phase != LifecyclePhase::Uninitialized {
                warn!(phase = ?*phase, "Lifecycle already initialized; ignoring");
                return Ok(());
            }
            *phase = LifecyclePhase::Hydrating;
        }
        debug!("Hydrating session from durable storage");

        let snapshot = match self
            .store
            .get_json::<SessionSnapshot>(keys::SESSION_SNAPSHOT)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Unreadable snapshot cannot be reconciled; discard it.
                warn!(error = %e, "Discarding unreadable session snapshot");
                if let Err(e) = self.store.remove(keys::SESSION_SNAPSHOT).await {
                    warn!(error = %e, "Failed to remove unreadable snapshot");
                }
                None
            }
        };
        self.session.hydrate(snapshot).await;

        *self.phase.write().await = LifecyclePhase::Reconciling;
        self.reconcile().await;
        *self.phase.write().await = LifecyclePhase::Ready;
        debug!("Session lifecycle ready");
        Ok(())
    }

    /// Establishes a fresh session after a successful login.
    ///
    /// Bypasses reconciliation entirely: installs the credential pair in
    /// memory and durable storage, then replaces the session atomically.
    pub async fn establish_session(
        &self,
        user: UserProfile,
        tenant_memberships: Vec<TenantRole>,
        active_slug: Option<&str>,
        is_superuser: bool,
        access_token: String,
        refresh_token: String,
    ) -> AppResult<()> {
        let credential = Credential::new(access_token, refresh_token)?;
        self.persist_credential(&credential).await;
        self.tokens.set(credential).await;
        self.session
            .set_session(user, tenant_memberships, active_slug, is_superuser)
            .await?;
        info!("Session established");
        Ok(())
    }

    /// Explicit logout: drops the credential everywhere and resets the
    /// session. Idempotent.
    pub async fn logout(&self) {
        self.force_logout().await;
        info!("Logged out");
    }

    /// The startup reconciliation described in the module docs.
    ///
    /// Only acts when the restored session claims to be authenticated but
    /// no credential is in memory (the normal situation after a reload).
    /// Network failures here are not retried; a later request's own 401
    /// handling owns subsequent attempts.
    async fn reconcile(&self) {
        let session = self.session.view().await;
        if !session.is_authenticated() {
            debug!("No authenticated session to reconcile");
            return;
        }
        if !self.tokens.is_empty().await {
            debug!("Credential already in memory; nothing to reconcile");
            return;
        }

        let access = match self.store.get(keys::ACCESS_TOKEN).await {
            Ok(Some(access)) => access,
            Ok(None) => {
                info!("Authenticated session restored without a stored credential; logging out");
                self.force_logout().await;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored access token; logging out");
                self.force_logout().await;
                return;
            }
        };
        let refresh = match self.store.get(keys::REFRESH_TOKEN).await {
            Ok(refresh) => refresh,
            Err(e) => {
                warn!(error = %e, "Failed to read stored refresh token");
                None
            }
        };

        // Expiry is decided locally; no network call for a live token.
        let claims = match decode_unverified(&access) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "Stored access token is undecodable; logging out");
                self.force_logout().await;
                return;
            }
        };

        if !claims.is_expired_at(Utc::now().timestamp()) {
            match Credential::new(access, refresh.unwrap_or_default()) {
                Ok(credential) => {
                    self.tokens.set(credential).await;
                    debug!("Restored stored credential without refresh");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to rebuild credential; logging out");
                    self.force_logout().await;
                }
            }
            return;
        }

        let Some(refresh) = refresh else {
            info!("Access token expired and no refresh token stored; logging out");
            self.force_logout().await;
            return;
        };

        // Tag the attempt with the generation it started against so a
        // late result never lands on a replaced session.
        let generation = self.session.generation().await;
        match self.refresher.refresh(&refresh).await {
            Ok(refreshed) => {
                if self.session.generation().await != generation {
                    info!("Session replaced during refresh; discarding result");
                    return;
                }
                // Reuse the old refresh token unless the server rotated it.
                let refresh = refreshed.refresh.unwrap_or(refresh);
                match Credential::new(refreshed.access, refresh) {
                    Ok(credential) => {
                        self.persist_credential(&credential).await;
                        self.tokens.set(credential).await;
                        info!("Access token refreshed during startup reconciliation");
                    }
                    Err(e) => {
                        warn!(error = %e, "Refreshed access token is undecodable; logging out");
                        self.force_logout().await;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Startup token refresh failed; logging out");
                self.force_logout().await;
            }
        }
    }

    /// Clears credentials from memory and durable storage and resets the
    /// session. Storage failures are logged, never propagated — the
    /// in-memory state must reach logged-out regardless.
    async fn force_logout(&self) {
        self.tokens.clear().await;
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key = %key, error = %e, "Failed to remove stored credential");
            }
        }
        self.session.clear().await;
    }

    async fn persist_credential(&self, credential: &Credential) {
        for (key, value) in [
            (keys::ACCESS_TOKEN, &credential.access_token),
            (keys::REFRESH_TOKEN, &credential.refresh_token),
        ] {
            if let Err(e) = self.store.set(key, value).await {
                warn!(key = %key, error = %e, "Failed to persist credential");
            }
        }
    }
}
