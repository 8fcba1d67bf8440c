//! Role-based view gating.
//!
//! [`decide`] is referentially transparent and total: the same session and
//! requirement always produce the same decision, and no well-formed
//! session can make it panic. Views call it on every protected render and
//! translate the decision into children, a login prompt, a redirect, or a
//! neutral pending state.

use queuedeck_core::types::Role;

use crate::state::Session;

/// Outcome of a gating decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hydration has not completed; render a neutral pending state, not a
    /// denial.
    Pending,
    /// Render the protected children.
    Allow,
    /// No authenticated user; render the login prompt.
    Unauthenticated,
    /// Authenticated but not permitted; redirect to the given route.
    Forbidden {
        /// Route the caller should land on instead.
        redirect: String,
    },
}

/// Decides whether a session may access a view requiring `required` roles.
///
/// Superusers bypass all tenant-role checks; non-superusers are
/// categorically excluded from superuser-only views. An empty requirement
/// means any authenticated session passes.
pub fn decide(session: &Session, required: &[Role]) -> GateDecision {
    if !session.hydrated {
        return GateDecision::Pending;
    }
    if !session.is_authenticated() {
        return GateDecision::Unauthenticated;
    }
    if required.is_empty() {
        return GateDecision::Allow;
    }
    if session.is_superuser {
        return GateDecision::Allow;
    }
    if required == [Role::SuperAdmin] {
        return GateDecision::Forbidden {
            redirect: default_landing(session),
        };
    }

    let active_role = session.active_tenant.as_ref().map(|t| t.role);
    let allowed = active_role.is_some_and(|role| {
        role != Role::SuperAdmin && required.contains(&role)
    });
    if allowed {
        GateDecision::Allow
    } else {
        GateDecision::Forbidden {
            redirect: route_for_role(active_role),
        }
    }
}

/// The caller's default tenant landing route, derived from the active
/// tenant's role.
fn default_landing(session: &Session) -> String {
    route_for_role(session.active_tenant.as_ref().map(|t| t.role))
}

/// Role→route table for forbidden redirects.
fn route_for_role(role: Option<Role>) -> String {
    match role {
        Some(Role::Agent) => "/agent",
        Some(Role::Manager) => "/dashboard",
        Some(Role::Admin) => "/sites",
        _ => "/login",
    }
    .to_string()
}
