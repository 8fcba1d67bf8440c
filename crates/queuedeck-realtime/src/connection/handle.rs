//! Connection handle state.

use std::fmt;

/// Lifecycle state of the logical connection.
///
/// `Idle → Connecting → Open`; `Open → Closed` on remote close or error,
/// then `Closed → Connecting` while retries remain, else terminal
/// `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection requested yet.
    Idle,
    /// A dial is in flight.
    Connecting,
    /// The transport is live.
    Open,
    /// An orderly local shutdown is in progress.
    Closing,
    /// The transport is down; possibly awaiting a retry, possibly
    /// terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Snapshot of the one live handle a manager owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    /// Resolved endpoint this handle is bound to.
    pub endpoint: String,
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Consecutive failed attempts since the last successful open.
    pub attempt: u32,
    /// Most recent transport error, if any.
    pub last_error: Option<String>,
}

impl ConnectionHandle {
    /// A fresh handle for an endpoint, before any dial.
    pub fn idle(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: ConnectionState::Idle,
            attempt: 0,
            last_error: None,
        }
    }
}
