//! # queuedeck-realtime
//!
//! Resilient real-time connection layer of the Queuedeck console client:
//! one logical bidirectional channel per consumer, reconnecting
//! automatically under network failure with bounded backoff, delivering
//! typed message envelopes in transport order.

pub mod connection;
pub mod endpoint;
pub mod message;

pub use connection::handle::{ConnectionHandle, ConnectionState};
pub use connection::manager::{ConnectionManager, ConnectionObserver};
pub use connection::policy::ReconnectPolicy;
pub use connection::timer::{RetryTimer, TokioTimer};
pub use connection::transport::{Connector, Transport, WsConnector};
pub use message::Envelope;
