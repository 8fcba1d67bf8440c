//! # queuedeck-storage
//!
//! Durable key-value store backends for the Queuedeck console client.
//!
//! Provides the [`DurableStore`](queuedeck_core::traits::DurableStore)
//! implementations the session layer persists through: an in-memory store
//! for tests and hosts that manage their own persistence, and a
//! file-backed store for the standalone console. Hosts with access to an
//! OS keychain can supply their own implementation instead.

pub mod file;
pub mod keys;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
