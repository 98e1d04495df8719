//! Integration tests for the process-wide session registry.
//!
//! Every test in this binary shares one registry, installed on first use.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::OnceCell;

use scaffold_core::error::{AppError, ErrorKind};
use scaffold_database::session::{self, ScopeOptions, context};
use scaffold_database::{MemorySession, RegistryOptions, SessionRegistry};

static REGISTRY: OnceCell<SessionRegistry> = OnceCell::const_new();

async fn registry() -> SessionRegistry {
    REGISTRY
        .get_or_init(|| async {
            session::initialize(RegistryOptions::default().url("memory://"))
                .await
                .expect("Failed to initialize session registry")
        })
        .await
        .clone()
}

async fn write(key: &str, value: Value) -> Result<(), AppError> {
    let session = session::current()?;
    let mut guard = session.lock().await?;
    guard.backend_mut::<MemorySession>()?.put(key, value)
}

async fn read(key: &str) -> Result<Option<Value>, AppError> {
    let session = session::current()?;
    let guard = session.lock().await?;
    guard.backend::<MemorySession>()?.get(key)
}

async fn read_committed(key: &str) -> Option<Value> {
    let key = key.to_string();
    session::scope(async move { read(&key).await })
        .await
        .expect("Failed to read in a fresh scope")
}

#[tokio::test]
async fn test_nested_scopes_follow_the_concrete_scenario() {
    registry().await;

    let err = session::current().unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoActiveSession);

    session::scope(async {
        let s1 = session::current()?;

        session::scope(async {
            let s2 = session::current()?;
            assert_ne!(s2, s1);
            Ok::<_, AppError>(())
        })
        .await?;

        assert_eq!(session::current()?, s1);
        Ok::<_, AppError>(())
    })
    .await
    .unwrap();

    let err = session::current().unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoActiveSession);
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let installed = registry().await;

    let err = session::initialize(RegistryOptions::default().url("memory://"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);

    let still_installed = session::registry().unwrap();
    assert!(std::sync::Arc::ptr_eq(
        &installed.engine(),
        &still_installed.engine()
    ));
}

#[tokio::test]
async fn test_deep_call_chain_sees_the_current_session() {
    registry().await;

    async fn leaf() -> Result<String, AppError> {
        Ok(session::current()?.id().to_string())
    }

    async fn middle() -> Result<String, AppError> {
        leaf().await
    }

    session::scope(async {
        let outer = session::current()?.id().to_string();
        assert_eq!(middle().await?, outer);
        Ok::<_, AppError>(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_commit_on_exit_controls_durability() {
    registry().await;

    session::scope(async { write("durability:discarded", json!(1)).await })
        .await
        .unwrap();
    assert_eq!(read_committed("durability:discarded").await, None);

    session::scope_with(ScopeOptions::default().commit_on_exit(true), async {
        write("durability:kept", json!(2)).await
    })
    .await
    .unwrap();
    assert_eq!(read_committed("durability:kept").await, Some(json!(2)));

    session::scope(async {
        write("durability:explicit", json!(3)).await?;
        session::current()?.commit().await
    })
    .await
    .unwrap();
    assert_eq!(read_committed("durability:explicit").await, Some(json!(3)));
}

#[tokio::test]
async fn test_failing_body_keeps_its_error_and_discards_writes() {
    registry().await;

    let err = session::scope_with(ScopeOptions::default().commit_on_exit(true), async {
        write("failure:k", json!(true)).await?;
        Err::<(), _>(AppError::validation("bad input"))
    })
    .await
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "bad input");
    assert_eq!(read_committed("failure:k").await, None);
    assert_eq!(
        session::current().unwrap_err().kind,
        ErrorKind::NoActiveSession
    );
}

#[tokio::test]
async fn test_concurrent_requests_are_isolated() {
    let registry = registry().await;

    let mut tasks = Vec::new();
    for i in 0..8u64 {
        tasks.push(tokio::spawn(async move {
            session::scope(async move {
                let mine = session::current()?;
                let key = format!("isolation:{i}");
                write(&key, json!(i)).await?;
                tokio::time::sleep(Duration::from_millis(8 - i)).await;
                assert_eq!(session::current()?, mine);
                assert_eq!(read(&key).await?, Some(json!(i)));
                mine.commit().await?;
                Ok::<_, AppError>(mine.id())
            })
            .await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);

    for i in 0..8u64 {
        assert_eq!(read_committed(&format!("isolation:{i}")).await, Some(json!(i)));
    }
    assert!(registry.current_session().is_err());
}

#[tokio::test]
async fn test_children_inherit_a_snapshot_only_when_spawned_through_the_context() {
    registry().await;

    session::scope(async {
        let parent = session::current()?;

        let inherited = context::spawn(async { session::current().map(|s| s.id()) })
            .await
            .map_err(|e| AppError::internal(e.to_string()))??;
        assert_eq!(inherited, parent.id());

        let bare = tokio::spawn(async { session::current() })
            .await
            .map_err(|e| AppError::internal(e.to_string()))?;
        assert_eq!(bare.unwrap_err().kind, ErrorKind::NoActiveSession);

        Ok::<_, AppError>(())
    })
    .await
    .unwrap();
}
