//! Per-task execution context holding the current session.
//!
//! The slot is a tokio task-local. A scoped handle binds its session for the
//! duration of its body; nested bindings shadow outer ones and are undone
//! when the inner body finishes. Tasks started with [`spawn`] (or futures
//! wrapped with [`inherit`]) receive a snapshot of the spawning task's slot;
//! tasks started with a bare `tokio::spawn` start with an empty slot.

use std::future::Future;

use tokio::task::JoinHandle;

use super::shared::Session;

tokio::task_local! {
    static CURRENT_SESSION: Option<Session>;
}

/// The session bound to the calling task, if any.
pub fn current() -> Option<Session> {
    CURRENT_SESSION
        .try_with(|slot| slot.clone())
        .ok()
        .flatten()
}

/// Run `fut` with `session` bound as the current session.
pub(crate) async fn bind<F: Future>(session: Session, fut: F) -> F::Output {
    CURRENT_SESSION.scope(Some(session), fut).await
}

/// Wrap `fut` so it runs with a snapshot of the caller's current binding.
///
/// The snapshot is taken now, not when the returned future is first polled.
pub fn inherit<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    CURRENT_SESSION.scope(current(), fut)
}

/// Spawn a child task that inherits a snapshot of the caller's binding.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(inherit(fut))
}
