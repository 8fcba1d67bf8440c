//! Connection lifecycle: handle, reconnect policy, transport seam, and
//! the manager that ties them together.

pub mod handle;
pub mod manager;
pub mod policy;
pub mod timer;
pub mod transport;
