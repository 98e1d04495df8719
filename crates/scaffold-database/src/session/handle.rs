//! Scoped session handle: acquire, bind, and guaranteed release.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, warn};

use scaffold_core::config::SessionOptions;
use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

use super::context;
use super::registry::SessionRegistry;
use super::shared::Session;

/// Lifecycle of a [`ScopedSession`]. `Active → Closing → Closed` is the only exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Created, no session opened yet.
    Unopened,
    /// A session is open and owned by this handle.
    Active,
    /// Commit or rollback and close are in progress.
    Closing,
    /// The session was committed or rolled back, then closed.
    Closed,
}

/// How the body of a scope finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The body returned `Ok`.
    Success,
    /// The body returned `Err`, panicked, or was cancelled.
    Failure,
}

/// Per-scope overrides of the registry defaults.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    /// Commit on successful exit; registry default when `None`.
    pub commit_on_exit: Option<bool>,
    /// Session options; registry default when `None`.
    pub session: Option<SessionOptions>,
}

impl ScopeOptions {
    /// Override whether a successful exit commits.
    pub fn commit_on_exit(mut self, commit: bool) -> Self {
        self.commit_on_exit = Some(commit);
        self
    }

    /// Override the session options.
    pub fn session(mut self, options: SessionOptions) -> Self {
        self.session = Some(options);
        self
    }
}

/// Owns one session for the duration of a scope.
///
/// [`run`](Self::run) is the normal entry point: it opens the session,
/// binds it as the current session for the body, and performs exactly one
/// of the three exits:
///
/// 1. body `Ok`, commit-on-exit: commit, close, unbind
/// 2. body `Ok`, no commit-on-exit: close (uncommitted writes discarded), unbind
/// 3. body `Err` or panic: rollback, close, unbind, then return the original
///    error or resume the original panic
///
/// If the handle is dropped while active (the `run` future was cancelled),
/// the failure exit runs on a spawned task.
#[derive(Debug)]
pub struct ScopedSession {
    registry: SessionRegistry,
    options: ScopeOptions,
    state: HandleState,
    session: Option<Session>,
}

impl ScopedSession {
    /// Create an unopened handle.
    pub fn new(registry: SessionRegistry, options: ScopeOptions) -> Self {
        Self {
            registry,
            options,
            state: HandleState::Unopened,
            session: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// The owned session while active.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a successful exit commits.
    pub fn commits_on_exit(&self) -> bool {
        self.options
            .commit_on_exit
            .unwrap_or_else(|| self.registry.commit_on_exit())
    }

    /// Open the session (`Unopened → Active`).
    ///
    /// This does not bind the session into the execution context; only
    /// [`run`](Self::run) does.
    pub async fn enter(&mut self) -> AppResult<Session> {
        if self.state != HandleState::Unopened {
            return Err(AppError::session(format!(
                "Scoped session cannot be entered from state {:?}",
                self.state
            )));
        }

        let engine = self.registry.engine();
        let options = self
            .options
            .session
            .as_ref()
            .unwrap_or_else(|| self.registry.session_options());
        let backend = engine.open_session(options).await?;
        let session = Session::new(self.registry.next_session_id(), backend, engine.name());

        debug!(
            session_id = %session.id(),
            engine = engine.name(),
            commit_on_exit = self.commits_on_exit(),
            "Session opened"
        );

        self.session = Some(session.clone());
        self.state = HandleState::Active;
        Ok(session)
    }

    /// Close the session (`Active → Closing → Closed`) according to `outcome`.
    ///
    /// Calling this on a handle that is not active returns a session error
    /// and leaves shared state untouched.
    pub async fn exit(&mut self, outcome: ExitOutcome) -> AppResult<()> {
        if self.state != HandleState::Active {
            warn!(state = ?self.state, "Exit called on a scoped session that is not active");
            return Err(AppError::session(format!(
                "Scoped session cannot exit from state {:?}",
                self.state
            )));
        }

        let commit = self.commits_on_exit();
        let Some(session) = self.session.clone() else {
            self.state = HandleState::Closed;
            return Err(AppError::session("Active scoped session has no session"));
        };
        self.state = HandleState::Closing;

        // Detached: the exit path runs to close even if `exit` is cancelled.
        let result = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime
                .spawn(async move { session.finish(outcome, commit).await })
                .await
                .unwrap_or_else(|e| {
                    Err(AppError::internal(format!("Session cleanup task failed: {e}")))
                }),
            Err(_) => session.finish(outcome, commit).await,
        };

        self.session = None;
        self.state = HandleState::Closed;
        result
    }

    /// Enter, run `body` with the session bound, and exit.
    pub async fn run<F, T, E>(mut self, body: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AppError>,
    {
        let session = self.enter().await.map_err(E::from)?;

        let (outcome, cleanup) = context::bind(session, async {
            let outcome = AssertUnwindSafe(body).catch_unwind().await;
            let exit = match &outcome {
                Ok(Ok(_)) => ExitOutcome::Success,
                _ => ExitOutcome::Failure,
            };
            let cleanup = self.exit(exit).await;
            (outcome, cleanup)
        })
        .await;

        match outcome {
            Ok(Ok(value)) => cleanup.map(|()| value).map_err(E::from),
            Ok(Err(err)) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "Session cleanup failed after body error");
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "Session cleanup failed after panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let state = std::mem::replace(&mut self.state, HandleState::Closed);
        let runtime = tokio::runtime::Handle::try_current();

        match (state, runtime) {
            (HandleState::Active, Ok(runtime)) => {
                warn!(session_id = %session.id(), "Scoped session dropped while active, rolling back");
                runtime.spawn(async move {
                    if let Err(e) = session.finish(ExitOutcome::Failure, false).await {
                        warn!(error = %e, "Rollback of abandoned session failed");
                    }
                });
            }
            // The exit path already runs on its own task.
            (HandleState::Closing, Ok(_)) => {
                debug!(session_id = %session.id(), "Scoped session dropped while closing");
            }
            (_, Err(_)) => {
                warn!(session_id = %session.id(), "Scoped session dropped outside a runtime, discarding");
                session.abandon();
            }
            _ => {}
        }
    }
}
