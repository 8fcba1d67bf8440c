//! Traits shared across Queuedeck crates.

pub mod store;

pub use store::DurableStore;
