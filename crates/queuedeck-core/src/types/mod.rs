//! Shared domain types.

pub mod role;
pub mod tenant;
pub mod user;

pub use role::Role;
pub use tenant::TenantRole;
pub use user::UserProfile;
