//! # queuedeck-core
//!
//! Core crate for the Queuedeck console client. Contains the unified error
//! system, configuration schemas, shared domain types (roles, tenant
//! memberships, user profile), and the traits the other crates hang off.
//!
//! This crate has **no** internal dependencies on other Queuedeck crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
