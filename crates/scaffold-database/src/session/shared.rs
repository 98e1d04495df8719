//! The shared session handle reachable through the execution context.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;
use scaffold_core::traits::DatabaseSession;
use scaffold_core::types::SessionId;

use super::handle::ExitOutcome;

/// A database session opened by a scoped handle.
///
/// Cloning is cheap and yields the same session. Access to the backend is
/// serialized, so a session is never used concurrently even when a snapshot
/// of it was handed to a child task.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: SessionId,
    engine: String,
    backend: Mutex<Box<dyn DatabaseSession>>,
    closed: AtomicBool,
}

impl Session {
    pub(crate) fn new(id: SessionId, backend: Box<dyn DatabaseSession>, engine: &str) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                engine: engine.to_string(),
                backend: Mutex::new(backend),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Unique identity of this session.
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Name of the engine that opened the session.
    pub fn engine(&self) -> &str {
        &self.inner.engine
    }

    /// Whether the owning handle has exited.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Exclusive access to the backend session.
    pub async fn lock(&self) -> AppResult<SessionGuard<'_>> {
        let guard = self.inner.backend.lock().await;
        if self.is_closed() {
            return Err(AppError::session(format!(
                "Session {} is closed",
                self.inner.id
            )));
        }
        Ok(SessionGuard {
            id: self.inner.id,
            guard,
        })
    }

    /// Commit the current transaction; the next use starts a new one.
    pub async fn commit(&self) -> AppResult<()> {
        self.lock().await?.commit().await
    }

    /// Roll back the current transaction; the next use starts a new one.
    pub async fn rollback(&self) -> AppResult<()> {
        self.lock().await?.rollback().await
    }

    /// Round-trip a trivial statement through the session.
    pub async fn ping(&self) -> AppResult<()> {
        self.lock().await?.ping().await
    }

    /// Run the exit path for `outcome`, then close the backend.
    ///
    /// Only the first call does anything; later calls return a session error.
    pub(crate) async fn finish(&self, outcome: ExitOutcome, commit: bool) -> AppResult<()> {
        let mut backend = self.inner.backend.lock().await;
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Err(AppError::session(format!(
                "Session {} already closed",
                self.inner.id
            )));
        }

        let result = match outcome {
            ExitOutcome::Success if commit => match backend.commit().await {
                Ok(()) => {
                    debug!(session_id = %self.inner.id, "Session committed");
                    Ok(())
                }
                Err(e) => {
                    if let Err(rollback_err) = backend.rollback().await {
                        tracing::warn!(
                            session_id = %self.inner.id,
                            error = %rollback_err,
                            "Rollback after failed commit also failed"
                        );
                    }
                    Err(e)
                }
            },
            ExitOutcome::Success => Ok(()),
            ExitOutcome::Failure => {
                let rolled_back = backend.rollback().await;
                debug!(session_id = %self.inner.id, "Session rolled back");
                rolled_back
            }
        };

        let closed = backend.close().await;
        debug!(session_id = %self.inner.id, ?outcome, "Session closed");
        result.and(closed)
    }

    /// Mark the session closed without touching the backend.
    ///
    /// The backend is dropped with the last clone, discarding uncommitted work.
    pub(crate) fn abandon(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("engine", &self.inner.engine)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Exclusive access to a session's backend, held for as long as the guard lives.
pub struct SessionGuard<'a> {
    id: SessionId,
    guard: MutexGuard<'a, Box<dyn DatabaseSession>>,
}

impl SessionGuard<'_> {
    /// Identity of the guarded session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The backend as its concrete type, e.g. `PgSession` or `MemorySession`.
    pub fn backend_mut<T: DatabaseSession>(&mut self) -> AppResult<&mut T> {
        self.guard.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
            AppError::session(format!(
                "Session backend is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Shared view of the backend as its concrete type.
    pub fn backend<T: DatabaseSession>(&self) -> AppResult<&T> {
        self.guard.as_any().downcast_ref::<T>().ok_or_else(|| {
            AppError::session(format!(
                "Session backend is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl Deref for SessionGuard<'_> {
    type Target = dyn DatabaseSession;

    fn deref(&self) -> &Self::Target {
        &**self.guard
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.guard
    }
}

impl fmt::Debug for SessionGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard").field("id", &self.id).finish()
    }
}
