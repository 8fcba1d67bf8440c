//! One-time startup reconciliation of session state against stored
//! credentials.

pub mod manager;
pub mod refresh;

pub use manager::{LifecyclePhase, SessionLifecycleManager};
pub use refresh::{HttpTokenRefresher, RefreshedTokens, TokenRefresher};
