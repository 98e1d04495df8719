//! PostgreSQL engine and sessions backed by a sqlx connection pool.

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use scaffold_core::config::{EngineOptions, SessionOptions};
use scaffold_core::error::{AppError, ErrorKind};
use scaffold_core::result::AppResult;
use scaffold_core::traits::{DatabaseEngine, DatabaseSession};

/// Engine wrapping the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgEngine {
    /// The underlying sqlx connection pool.
    pool: PgPool,
}

impl PgEngine {
    /// Create a new engine, connecting the pool eagerly.
    pub async fn connect(url: &str, options: &EngineOptions) -> AppResult<Self> {
        info!(
            url = %mask_password(url),
            max_connections = options.max_connections,
            min_connections = options.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(Duration::from_secs(options.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(options.idle_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseEngine for PgEngine {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn open_session(&self, options: &SessionOptions) -> AppResult<Box<dyn DatabaseSession>> {
        if self.pool.is_closed() {
            return Err(AppError::database("Database pool is closed"));
        }
        Ok(Box::new(PgSession::new(self.pool.clone(), options.clone())))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// A PostgreSQL session.
///
/// The transaction is started lazily on first use and again after every
/// commit or rollback, so a session can span several transactions.
pub struct PgSession {
    pool: PgPool,
    options: SessionOptions,
    tx: Option<Transaction<'static, Postgres>>,
    closed: bool,
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession")
            .field("options", &self.options)
            .field("in_transaction", &self.tx.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

impl PgSession {
    fn new(pool: PgPool, options: SessionOptions) -> Self {
        Self {
            pool,
            options,
            tx: None,
            closed: false,
        }
    }

    /// Connection inside the session's current transaction.
    pub async fn connection(&mut self) -> AppResult<&mut PgConnection> {
        if self.closed {
            return Err(AppError::session("Session is closed"));
        }
        if self.tx.is_none() {
            let tx = self.begin().await?;
            self.tx = Some(tx);
        }
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(AppError::session("Transaction not available")),
        }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if let Some(statement) = transaction_modes(&self.options) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to apply transaction options",
                        e,
                    )
                })?;
        }

        debug!("Transaction started");
        Ok(tx)
    }
}

#[async_trait]
impl DatabaseSession for PgSession {
    async fn commit(&mut self) -> AppResult<()> {
        if self.closed {
            return Err(AppError::session("Session is closed"));
        }
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
            })?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            })?;
        }
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Returns the connection to the pool.
        self.rollback().await
    }

    async fn ping(&mut self) -> AppResult<()> {
        let conn = self.connection().await?;
        sqlx::query("SELECT 1")
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Session ping failed", e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// `SET TRANSACTION` statement for the given options, if any apply.
fn transaction_modes(options: &SessionOptions) -> Option<String> {
    let mut modes = Vec::new();
    if let Some(level) = options.isolation_level {
        modes.push(format!("ISOLATION LEVEL {level}"));
    }
    if options.read_only {
        modes.push("READ ONLY".to_string());
    }
    if modes.is_empty() {
        None
    } else {
        Some(format!("SET TRANSACTION {}", modes.join(", ")))
    }
}

/// Mask the password portion of a database URL for safe logging.
pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
