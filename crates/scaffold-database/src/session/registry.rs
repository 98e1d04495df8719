//! Session registry: owns the process-wide engine and hands out scoped sessions.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use scaffold_core::config::{DatabaseConfig, EngineOptions, SessionOptions};
use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;
use scaffold_core::traits::DatabaseEngine;
use scaffold_core::types::{IdGenerator, SessionId, UuidGenerator};

use super::context;
use super::handle::{ScopeOptions, ScopedSession};
use super::shared::Session;
use crate::connection::{PgEngine, mask_password};
use crate::memory::MemoryEngine;

/// Options for building a [`SessionRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Connection target. Ignored when `engine` is set.
    pub url: Option<String>,
    /// A pre-built engine.
    pub engine: Option<Arc<dyn DatabaseEngine>>,
    /// Pool options used when building from `url`.
    pub engine_options: EngineOptions,
    /// Default options for every session.
    pub session_options: SessionOptions,
    /// Default commit-on-exit behaviour.
    pub commit_on_exit: bool,
    /// Source of session identities; UUIDv7 when `None`.
    pub id_generator: Option<Arc<dyn IdGenerator>>,
}

impl RegistryOptions {
    /// Options built from the `database` config section.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            engine: None,
            engine_options: config.pool.clone(),
            session_options: config.session.clone(),
            commit_on_exit: config.commit_on_exit,
            id_generator: None,
        }
    }

    /// Set the connection target.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use a pre-built engine instead of connecting from the URL.
    pub fn engine(mut self, engine: Arc<dyn DatabaseEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the pool options.
    pub fn engine_options(mut self, options: EngineOptions) -> Self {
        self.engine_options = options;
        self
    }

    /// Set the default session options.
    pub fn session_options(mut self, options: SessionOptions) -> Self {
        self.session_options = options;
        self
    }

    /// Set the default commit-on-exit behaviour.
    pub fn commit_on_exit(mut self, commit: bool) -> Self {
        self.commit_on_exit = commit;
        self
    }

    /// Set the source of session identities.
    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }
}

/// Process-wide source of scoped sessions.
///
/// Cheap to clone; all clones share one engine.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    engine: Arc<dyn DatabaseEngine>,
    session_options: SessionOptions,
    commit_on_exit: bool,
    id_generator: Arc<dyn IdGenerator>,
    /// Whether the engine was built by this registry (and so is closed by it).
    owns_engine: bool,
}

impl SessionRegistry {
    /// Build a registry, creating the engine from the URL unless one is supplied.
    pub async fn new(options: RegistryOptions) -> AppResult<Self> {
        let (engine, owns_engine) = match (options.engine, options.url.as_deref()) {
            (Some(engine), _) => (engine, false),
            (None, Some(url)) => (build_engine(url, &options.engine_options).await?, true),
            (None, None) => {
                return Err(AppError::configuration(
                    "Session registry needs a database url or an engine",
                ));
            }
        };

        info!(
            engine = engine.name(),
            commit_on_exit = options.commit_on_exit,
            read_only = options.session_options.read_only,
            "Session registry ready"
        );

        Ok(Self {
            inner: Arc::new(RegistryInner {
                engine,
                session_options: options.session_options,
                commit_on_exit: options.commit_on_exit,
                id_generator: options
                    .id_generator
                    .unwrap_or_else(|| Arc::new(UuidGenerator)),
                owns_engine,
            }),
        })
    }

    /// The engine sessions are opened from.
    pub fn engine(&self) -> Arc<dyn DatabaseEngine> {
        Arc::clone(&self.inner.engine)
    }

    /// Default session options.
    pub fn session_options(&self) -> &SessionOptions {
        &self.inner.session_options
    }

    /// Default commit-on-exit behaviour.
    pub fn commit_on_exit(&self) -> bool {
        self.inner.commit_on_exit
    }

    pub(crate) fn next_session_id(&self) -> SessionId {
        SessionId::generate(self.inner.id_generator.as_ref())
    }

    /// A new, unopened scoped handle.
    pub fn handle(&self, options: ScopeOptions) -> ScopedSession {
        ScopedSession::new(self.clone(), options)
    }

    /// Run `body` inside a scoped session with the registry defaults.
    pub async fn scope<F, T, E>(&self, body: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AppError>,
    {
        self.handle(ScopeOptions::default()).run(body).await
    }

    /// Run `body` inside a scoped session with per-scope overrides.
    pub async fn scope_with<F, T, E>(&self, options: ScopeOptions, body: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AppError>,
    {
        self.handle(options).run(body).await
    }

    /// Session of the innermost enclosing scope on this task.
    pub fn current_session(&self) -> AppResult<Session> {
        context::current().ok_or_else(AppError::no_active_session)
    }

    /// Close the engine if this registry built it.
    pub async fn close(&self) {
        if self.inner.owns_engine {
            self.inner.engine.close().await;
            info!(engine = self.inner.engine.name(), "Session registry closed");
        }
    }
}

async fn build_engine(url: &str, options: &EngineOptions) -> AppResult<Arc<dyn DatabaseEngine>> {
    let scheme = url.split("://").next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => Ok(Arc::new(PgEngine::connect(url, options).await?)),
        "memory" => {
            info!("Using in-memory database engine");
            Ok(Arc::new(MemoryEngine::new()))
        }
        _ => Err(AppError::configuration(format!(
            "Unsupported database url: {}",
            mask_password(url)
        ))),
    }
}
