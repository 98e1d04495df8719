//! Core type definitions used across the scaffold workspace.

pub mod id;
pub mod response;

pub use id::{IdGenerator, SessionId, UuidGenerator};
pub use response::ResponseCode;
