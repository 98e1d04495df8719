//! In-process transactional key/value engine.
//!
//! Committed values live in a shared [`DashMap`]; each session stages its
//! writes privately and applies them on commit. Used for local development
//! (`memory://` URLs) and tests.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use scaffold_core::config::SessionOptions;
use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;
use scaffold_core::traits::{DatabaseEngine, DatabaseSession};

/// Lifecycle counters shared by an engine and all of its sessions.
#[derive(Debug, Default)]
struct Counters {
    opened: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    closed: AtomicU64,
}

/// Snapshot of an engine's session lifecycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Sessions opened.
    pub opened: u64,
    /// Commits performed.
    pub committed: u64,
    /// Rollbacks performed.
    pub rolled_back: u64,
    /// Sessions closed.
    pub closed: u64,
}

impl EngineStats {
    /// Sessions opened but not yet closed.
    pub fn open_sessions(&self) -> u64 {
        self.opened.saturating_sub(self.closed)
    }
}

/// In-memory engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    /// Committed data.
    store: Arc<DashMap<String, Value>>,
    counters: Arc<Counters>,
    shut_down: Arc<AtomicBool>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a committed value, bypassing any session.
    pub fn committed(&self, key: &str) -> Option<Value> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Write a committed value directly, bypassing any session.
    pub fn seed(&self, key: impl Into<String>, value: Value) {
        self.store.insert(key.into(), value);
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the engine holds no committed keys.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Current lifecycle counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            opened: self.counters.opened.load(Ordering::SeqCst),
            committed: self.counters.committed.load(Ordering::SeqCst),
            rolled_back: self.counters.rolled_back.load(Ordering::SeqCst),
            closed: self.counters.closed.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl DatabaseEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open_session(&self, options: &SessionOptions) -> AppResult<Box<dyn DatabaseSession>> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(AppError::database("Memory engine is closed"));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            store: Arc::clone(&self.store),
            counters: Arc::clone(&self.counters),
            staged: HashMap::new(),
            read_only: options.read_only,
            closed: false,
        }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.shut_down.load(Ordering::SeqCst))
    }

    async fn close(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        debug!("Memory engine closed");
    }
}

/// Session over a [`MemoryEngine`].
///
/// `None` in the staging map marks a pending delete.
#[derive(Debug)]
pub struct MemorySession {
    store: Arc<DashMap<String, Value>>,
    counters: Arc<Counters>,
    staged: HashMap<String, Option<Value>>,
    read_only: bool,
    closed: bool,
}

impl MemorySession {
    /// Read a value as seen by this session's transaction.
    pub fn get(&self, key: &str) -> AppResult<Option<Value>> {
        self.ensure_open()?;
        match self.staged.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.store.get(key).map(|entry| entry.value().clone())),
        }
    }

    /// Stage a write.
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> AppResult<()> {
        self.ensure_writable()?;
        self.staged.insert(key.into(), Some(value));
        Ok(())
    }

    /// Stage a delete.
    pub fn delete(&mut self, key: &str) -> AppResult<()> {
        self.ensure_writable()?;
        self.staged.insert(key.to_string(), None);
        Ok(())
    }

    /// Number of staged, uncommitted writes.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed {
            return Err(AppError::session("Session is closed"));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> AppResult<()> {
        self.ensure_open()?;
        if self.read_only {
            return Err(AppError::database(
                "Cannot write in a read-only transaction",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseSession for MemorySession {
    async fn commit(&mut self) -> AppResult<()> {
        self.ensure_open()?;
        for (key, value) in self.staged.drain() {
            match value {
                Some(value) => {
                    self.store.insert(key, value);
                }
                None => {
                    self.store.remove(&key);
                }
            }
        }
        self.counters.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.staged.clear();
        self.counters.rolled_back.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.staged.clear();
        self.closed = true;
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&mut self) -> AppResult<()> {
        self.ensure_open()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
