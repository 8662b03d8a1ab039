//! # filegate-core
//!
//! Core crate for FileGate. Contains the storage and metadata-store
//! boundary traits, configuration schemas, logging setup, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other FileGate crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
