//! # scaffold-core
//!
//! Core crate for the web-service scaffold. Contains configuration schemas,
//! the unified error system with its stable response codes, typed
//! identifiers, and the database engine/session traits that backends
//! implement.
//!
//! This crate has **no** internal dependencies on other scaffold crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
