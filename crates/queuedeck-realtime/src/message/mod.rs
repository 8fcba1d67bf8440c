//! Typed message framing for the real-time channel.

pub mod envelope;

pub use envelope::Envelope;
