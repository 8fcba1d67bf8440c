//! Process-wide session state container and its persisted snapshot.

pub mod session;
pub mod snapshot;

pub use session::{Session, SessionState};
pub use snapshot::SessionSnapshot;
