//! Core traits defined in `scaffold-core` and implemented by other crates.

pub mod database;

pub use database::{DatabaseEngine, DatabaseSession};
