//! # queuedeck-session
//!
//! Authenticated-session layer of the Queuedeck console client: the
//! volatile credential holder, the process-wide session state container
//! with its persisted snapshot, the one-time startup reconciliation
//! manager, and the pure role-gating decision function.

pub mod gate;
pub mod lifecycle;
pub mod state;
pub mod token;

pub use gate::{GateDecision, decide};
pub use lifecycle::{LifecyclePhase, SessionLifecycleManager};
pub use state::{Session, SessionState};
pub use token::{Credential, TokenStore};
