//! Serializable session snapshot for durable storage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use queuedeck_core::types::{TenantRole, UserProfile};

use super::session::Session;

/// The durable form of a session.
///
/// Deliberately excludes credentials: tokens live in the token store and
/// reach durable storage only through their own keys, never inside the
/// snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Authenticated user, if any.
    pub user: Option<UserProfile>,
    /// Tenant memberships with roles.
    #[serde(default)]
    pub tenant_memberships: Vec<TenantRole>,
    /// ID of the active tenant (nil for the synthetic superuser tenant).
    pub active_tenant_id: Option<Uuid>,
    /// Privileged superuser flag.
    #[serde(default)]
    pub is_superuser: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            tenant_memberships: session.tenant_memberships.clone(),
            active_tenant_id: session.active_tenant.as_ref().map(|t| t.tenant_id),
            is_superuser: session.is_superuser,
        }
    }
}

impl SessionSnapshot {
    /// Rebuilds an unhydrated session from the snapshot.
    ///
    /// The active tenant is re-derived from the membership list rather
    /// than trusted from storage, so a snapshot whose active-tenant ID no
    /// longer matches any membership is reconciled instead of producing an
    /// orphan reference.
    pub fn into_session(self) -> Session {
        let active_tenant = match self.active_tenant_id {
            Some(id) if id.is_nil() && self.is_superuser => {
                Some(TenantRole::synthetic_superuser())
            }
            Some(id) => self.tenant_memberships.iter().find(|t| t.tenant_id == id).cloned(),
            None => None,
        }
        .or_else(|| self.tenant_memberships.first().cloned())
        .or_else(|| {
            if self.is_superuser && self.tenant_memberships.is_empty() {
                Some(TenantRole::synthetic_superuser())
            } else {
                None
            }
        });

        Session {
            user: self.user,
            tenant_memberships: self.tenant_memberships,
            active_tenant,
            is_superuser: self.is_superuser,
            hydrated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuedeck_core::types::Role;

    fn membership(slug: &str, role: Role) -> TenantRole {
        TenantRole::new(Uuid::new_v4(), slug, slug.to_uppercase(), role)
    }

    fn user() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), "ops", "ops@example.com")
    }

    #[test]
    fn test_round_trip_preserves_active_tenant() {
        let a = membership("alpha", Role::Manager);
        let b = membership("beta", Role::Agent);
        let session = Session {
            user: Some(user()),
            tenant_memberships: vec![a.clone(), b.clone()],
            active_tenant: Some(b.clone()),
            is_superuser: false,
            hydrated: true,
        };

        let json = serde_json::to_string(&SessionSnapshot::from(&session)).unwrap();
        let restored = serde_json::from_str::<SessionSnapshot>(&json)
            .unwrap()
            .into_session();
        assert_eq!(restored.active_tenant, Some(b));
        assert!(!restored.hydrated);
    }

    #[test]
    fn test_orphan_active_tenant_is_reconciled() {
        let a = membership("alpha", Role::Admin);
        let snapshot = SessionSnapshot {
            user: Some(user()),
            tenant_memberships: vec![a.clone()],
            active_tenant_id: Some(Uuid::new_v4()),
            is_superuser: false,
        };
        let session = snapshot.into_session();
        assert_eq!(session.active_tenant, Some(a));
    }

    #[test]
    fn test_superuser_without_memberships_gets_synthetic_tenant() {
        let snapshot = SessionSnapshot {
            user: Some(user()),
            tenant_memberships: vec![],
            active_tenant_id: Some(Uuid::nil()),
            is_superuser: true,
        };
        let session = snapshot.into_session();
        assert!(session.active_tenant.as_ref().unwrap().is_synthetic());
    }

    #[test]
    fn test_snapshot_never_contains_token_fields() {
        let snapshot = SessionSnapshot {
            user: None,
            tenant_memberships: vec![],
            active_tenant_id: None,
            is_superuser: false,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("accessToken"));
        assert!(!json.contains("refreshToken"));
    }
}
