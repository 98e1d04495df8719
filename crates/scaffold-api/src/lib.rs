//! # scaffold-api
//!
//! HTTP boundary for the scaffold built on Axum.
//!
//! Every request runs inside a scoped database session opened by the
//! `db_session` middleware; handlers reach it as "the current session"
//! without threading it through their signatures. Responses and errors are
//! rendered in the uniform `{code, message, success, data, timestamp}`
//! envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
