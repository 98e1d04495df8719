//! Behaviour before the process-wide registry is installed.
//!
//! Nothing in this binary calls `initialize`.

use scaffold_core::error::{AppError, ErrorKind};
use scaffold_database::session::{self, context};

#[tokio::test]
async fn test_current_reports_missing_registry() {
    let err = session::current().unwrap_err();
    assert_eq!(err.kind, ErrorKind::RegistryNotInitialized);
    assert!(context::current().is_none());
}

#[tokio::test]
async fn test_registry_lookup_fails() {
    let err = session::registry().unwrap_err();
    assert_eq!(err.kind, ErrorKind::RegistryNotInitialized);
}

#[tokio::test]
async fn test_scope_fails_without_running_the_body() {
    let mut ran = false;
    let err = session::scope(async {
        ran = true;
        Ok::<_, AppError>(())
    })
    .await
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::RegistryNotInitialized);
    assert!(!ran);
}
