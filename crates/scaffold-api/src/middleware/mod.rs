//! Axum middleware stack.

pub mod db_session;
pub mod logging;
