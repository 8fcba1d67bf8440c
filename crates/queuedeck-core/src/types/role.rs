//! Administrative role held within a tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Role a user holds within one tenant, scoping which console views the
/// session may access.
///
/// Roles are independent per tenant; the same user can be an `Admin` in
/// one tenant and an `Agent` in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Platform operator role; only meaningful on the synthetic tenant.
    SuperAdmin,
    /// Full administrative access within a tenant.
    Admin,
    /// Queue and team management within a tenant.
    Manager,
    /// Day-to-day queue handling within a tenant.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super-admin"),
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "agent" => Ok(Self::Agent),
            other => Err(AppError::internal(format!("Unknown role '{other}'"))),
        }
    }
}
