//! Engine and session traits for pluggable database backends.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::config::SessionOptions;
use crate::result::AppResult;

/// A process-wide connection source (pool) that opens sessions.
///
/// One engine is built at startup and lives until shutdown. Implementations
/// manage their own connection checkout locking; application code never
/// touches the engine directly, only through the session registry.
#[async_trait]
pub trait DatabaseEngine: Send + Sync + fmt::Debug + 'static {
    /// Short backend name used in logs (`"postgres"`, `"memory"`).
    fn name(&self) -> &str;

    /// Open a new session with its own transaction.
    async fn open_session(&self, options: &SessionOptions) -> AppResult<Box<dyn DatabaseSession>>;

    /// Check engine connectivity.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release all pooled connections. Sessions opened afterwards fail.
    async fn close(&self);
}

/// A unit of work against the database, owned by one scoped handle.
///
/// A session always has a transaction available: after `commit` or
/// `rollback` the next use starts a fresh one. Dropping a session without
/// calling `close` must discard any uncommitted work.
#[async_trait]
pub trait DatabaseSession: Send + fmt::Debug + 'static {
    /// Make the current transaction's writes durable.
    async fn commit(&mut self) -> AppResult<()>;

    /// Discard the current transaction's writes.
    async fn rollback(&mut self) -> AppResult<()>;

    /// Release the session's connection. Uncommitted writes are discarded.
    async fn close(&mut self) -> AppResult<()>;

    /// Round-trip a trivial statement through the session.
    async fn ping(&mut self) -> AppResult<()>;

    /// Typed access for backend-specific operations.
    fn as_any(&self) -> &dyn Any;

    /// Mutable typed access for backend-specific operations.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
