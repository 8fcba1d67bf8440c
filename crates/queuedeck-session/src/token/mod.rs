//! Volatile credential holding and access-token inspection.

pub mod claims;
pub mod store;

pub use claims::AccessClaims;
pub use store::{Credential, TokenStore};
