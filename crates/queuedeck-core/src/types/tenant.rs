//! Tenant membership types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// One tenant membership: the tenant's identity plus the role and
/// fine-grained permission scopes the user holds in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRole {
    /// Tenant identifier.
    pub tenant_id: Uuid,
    /// URL-safe tenant slug.
    pub slug: String,
    /// Human-readable tenant name.
    pub name: String,
    /// Role held within this tenant.
    pub role: Role,
    /// Fine-grained permission scopes, orthogonal to role-based gating.
    #[serde(default)]
    pub scopes: HashSet<String>,
}

impl TenantRole {
    /// Creates a membership with no scopes.
    pub fn new(tenant_id: Uuid, slug: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            tenant_id,
            slug: slug.into(),
            name: name.into(),
            role,
            scopes: HashSet::new(),
        }
    }

    /// The synthetic membership a superuser falls back to when they hold
    /// no explicit tenant memberships. Identified by the nil tenant ID.
    pub fn synthetic_superuser() -> Self {
        Self {
            tenant_id: Uuid::nil(),
            slug: "_platform".to_string(),
            name: "All tenants".to_string(),
            role: Role::SuperAdmin,
            scopes: HashSet::new(),
        }
    }

    /// Whether this is the synthetic superuser membership.
    pub fn is_synthetic(&self) -> bool {
        self.tenant_id.is_nil()
    }
}
