//! The process-wide session state container.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;
use queuedeck_core::traits::DurableStore;
use queuedeck_core::types::{Role, TenantRole, UserProfile};
use queuedeck_storage::keys;

use super::snapshot::SessionSnapshot;

/// An immutable view of the current session.
///
/// Invariant: `active_tenant` is `None`, a member of `tenant_memberships`,
/// or the synthetic superuser tenant — never an orphan reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Authenticated user, if any.
    pub user: Option<UserProfile>,
    /// Tenant memberships with roles.
    pub tenant_memberships: Vec<TenantRole>,
    /// Currently active tenant.
    pub active_tenant: Option<TenantRole>,
    /// Privileged superuser flag.
    pub is_superuser: bool,
    /// Whether durable-storage restore has completed. Gating decisions
    /// made before this flips are "unknown", never "denied".
    pub hydrated: bool,
}

impl Session {
    /// The initial empty session.
    pub fn empty() -> Self {
        Self {
            user: None,
            tenant_memberships: Vec::new(),
            active_tenant: None,
            is_superuser: false,
            hydrated: false,
        }
    }

    /// Whether a user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Literal role check against the active tenant.
    ///
    /// Superusers get no automatic pass here; superuser escalation is the
    /// access gate's concern, not the session's.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        match &self.active_tenant {
            Some(tenant) => roles.contains(&tenant.role),
            None => false,
        }
    }

    /// Whether the active tenant carries the given permission scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        match &self.active_tenant {
            Some(tenant) => tenant.scopes.contains(scope),
            None => false,
        }
    }
}

/// The single owned session container.
///
/// All mutation goes through the explicit API below; every mutation
/// persists a credential-free snapshot to durable storage as a side
/// channel. In-process reads never touch storage.
pub struct SessionState {
    /// Current session plus its generation counter.
    inner: RwLock<Inner>,
    /// Snapshot side channel.
    store: Arc<dyn DurableStore>,
}

struct Inner {
    session: Session,
    /// Bumped on `set_session` and `clear` so in-flight work started
    /// against a replaced session can detect it was superseded.
    generation: u64,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState").finish()
    }
}

impl SessionState {
    /// Creates an empty, unhydrated session container.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                session: Session::empty(),
                generation: 0,
            }),
            store,
        }
    }

    /// Returns a copy of the current session.
    pub async fn view(&self) -> Session {
        self.inner.read().await.session.clone()
    }

    /// Returns the current session generation.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Atomically replaces the session.
    ///
    /// The active tenant becomes the membership named by `active_slug` if
    /// present, else the first membership, else the synthetic superuser
    /// tenant when `is_superuser` and no memberships exist, else `None`.
    /// Marks the session hydrated: a freshly established session is fully
    /// known by construction.
    pub async fn set_session(
        &self,
        user: UserProfile,
        tenant_memberships: Vec<TenantRole>,
        active_slug: Option<&str>,
        is_superuser: bool,
    ) -> AppResult<()> {
        let active_tenant = active_slug
            .and_then(|slug| tenant_memberships.iter().find(|t| t.slug == slug).cloned())
            .or_else(|| tenant_memberships.first().cloned())
            .or_else(|| {
                if is_superuser {
                    Some(TenantRole::synthetic_superuser())
                } else {
                    None
                }
            });

        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.session = Session {
                user: Some(user),
                tenant_memberships,
                active_tenant,
                is_superuser,
                hydrated: true,
            };
            inner.generation += 1;
            SessionSnapshot::from(&inner.session)
        };
        self.persist(&snapshot).await
    }

    /// Activates another tenant from the membership list.
    pub async fn switch_tenant(&self, tenant_id: Uuid) -> AppResult<()> {
        let snapshot = {
            let mut inner = self.inner.write().await;
            let Some(tenant) = inner
                .session
                .tenant_memberships
                .iter()
                .find(|t| t.tenant_id == tenant_id)
                .cloned()
            else {
                return Err(AppError::invalid_tenant(format!(
                    "User is not a member of tenant {tenant_id}"
                )));
            };
            inner.session.active_tenant = Some(tenant);
            SessionSnapshot::from(&inner.session)
        };
        self.persist(&snapshot).await
    }

    /// Resets to the empty state. Idempotent.
    ///
    /// Hydration is a property of the process, not of any one session, so
    /// the flag survives a clear; the gate must keep answering
    /// `Unauthenticated` rather than `Pending` after logout.
    pub async fn clear(&self) {
        {
            let mut inner = self.inner.write().await;
            let hydrated = inner.session.hydrated;
            inner.session = Session {
                hydrated,
                ..Session::empty()
            };
            inner.generation += 1;
        }
        if let Err(e) = self.store.remove(keys::SESSION_SNAPSHOT).await {
            warn!(error = %e, "Failed to remove persisted session snapshot");
        }
    }

    /// One-time merge of the durable snapshot into memory, flipping
    /// `hydrated` false→true. A second call is ignored.
    pub async fn hydrate(&self, snapshot: Option<SessionSnapshot>) {
        let mut inner = self.inner.write().await;
        if inner.session.hydrated {
            warn!("Session already hydrated; ignoring duplicate hydration");
            return;
        }
        if let Some(snapshot) = snapshot {
            inner.session = snapshot.into_session();
        }
        inner.session.hydrated = true;
        debug!(
            authenticated = inner.session.is_authenticated(),
            memberships = inner.session.tenant_memberships.len(),
            "Session hydrated"
        );
    }

    async fn persist(&self, snapshot: &SessionSnapshot) -> AppResult<()> {
        self.store.set_json(keys::SESSION_SNAPSHOT, snapshot).await
    }
}
