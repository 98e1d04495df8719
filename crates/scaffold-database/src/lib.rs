//! # scaffold-database
//!
//! Database engines and the context-scoped session manager.
//!
//! ## Modules
//!
//! - `connection`: PostgreSQL engine backed by a sqlx pool
//! - `memory`: in-process transactional key/value engine
//! - `repositories`: data access through the current session
//! - `session`: session registry, scoped session handle, and the per-task
//!   execution context that makes "the current session" reachable from any
//!   depth of a call chain

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod session;

pub use connection::{PgEngine, PgSession};
pub use memory::{EngineStats, MemoryEngine, MemorySession};
pub use repositories::CredentialRepository;
pub use session::{
    ExitOutcome, HandleState, RegistryOptions, ScopeOptions, ScopedSession, Session,
    SessionGuard, SessionRegistry,
};
