// crates/persistent-store-sqlite/tests/storage_handle_unit.rs
// ============================================================================
// Module: Storage Handle Unit Tests
// Description: Connection lifecycle and failure classification.
// Purpose: Validate open/close, schema versioning, and unavailability rules.
// ============================================================================

//! ## Overview
//! Unit-level tests for [`StorageHandle`]:
//! - Path safety checks and parent directory creation
//! - Schema creation and version validation
//! - Closed handles and vanished files report unavailability
//! - Scope rejection

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::config_for_path;
use common::db_path;
use persistent_store_core::ScopeType;
use persistent_store_core::StoreError;
use persistent_store_sqlite::SqliteStoreConfig;
use persistent_store_sqlite::SqliteStoreError;
use persistent_store_sqlite::StorageHandle;
use rusqlite::Connection;
use tempfile::TempDir;

fn open_handle(dir: &TempDir) -> StorageHandle {
    let handle = StorageHandle::new(config_for_path(&db_path(dir), 100, 10, 50)).unwrap();
    handle.open().unwrap();
    handle
}

fn count_namespaces(handle: &StorageHandle) -> Result<usize, SqliteStoreError> {
    handle.read_transaction(ScopeType::Device, |tx| Ok(tx.namespaces()?.len()))
}

#[test]
fn open_creates_parent_directory_and_schema() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    assert!(db_path(&dir).exists());
    assert!(handle.is_open());
    assert_eq!(count_namespaces(&handle).unwrap(), 0);

    let connection = Connection::open(db_path(&dir)).unwrap();
    let version: i64 =
        connection.query_row("SELECT version FROM store_meta", [], |row| row.get(0)).unwrap();
    assert_eq!(version, 1);
}

#[test]
fn handle_starts_closed() {
    let dir = TempDir::new().unwrap();
    let handle = StorageHandle::new(SqliteStoreConfig::new(db_path(&dir))).unwrap();
    assert!(!handle.is_open());
    let Err(err) = count_namespaces(&handle) else {
        panic!("closed handle must be unavailable");
    };
    assert!(matches!(err, SqliteStoreError::Unavailable(_)), "unexpected error: {err:?}");
}

#[test]
fn close_makes_handle_unavailable_until_reopened() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    handle
        .write_transaction(ScopeType::Device, |tx| {
            tx.create_namespace("ns1")?;
            Ok::<_, SqliteStoreError>(())
        })
        .unwrap();
    handle.close().unwrap();
    handle.close().unwrap();
    assert!(!handle.is_open());
    assert!(matches!(count_namespaces(&handle), Err(SqliteStoreError::Unavailable(_))));

    handle.open().unwrap();
    assert_eq!(count_namespaces(&handle).unwrap(), 1);
}

#[test]
fn missing_backing_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    std::fs::remove_file(db_path(&dir)).unwrap();
    let Err(err) = count_namespaces(&handle) else {
        panic!("vanished file must be unavailable");
    };
    assert!(matches!(err, SqliteStoreError::Unavailable(_)), "unexpected error: {err:?}");
    assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));

    handle.open().unwrap();
    assert_eq!(count_namespaces(&handle).unwrap(), 0);
}

#[test]
fn failed_operation_rolls_back() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    let result: Result<(), SqliteStoreError> = handle.write_transaction(ScopeType::Device, |tx| {
        tx.create_namespace("ns1")?;
        Err(SqliteStoreError::Invalid("abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(count_namespaces(&handle).unwrap(), 0);
}

#[test]
fn account_scope_is_rejected() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    let result: Result<usize, SqliteStoreError> =
        handle.read_transaction(ScopeType::Account, |tx| Ok(tx.namespaces()?.len()));
    let Err(err) = result else {
        panic!("account scope must be rejected");
    };
    assert!(matches!(StoreError::from(err), StoreError::General(_)));
}

#[test]
fn schema_version_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    {
        let connection = Connection::open(&path).unwrap();
        connection
            .execute_batch(
                "CREATE TABLE store_meta (version INTEGER NOT NULL);
                 INSERT INTO store_meta (version) VALUES (99);",
            )
            .unwrap();
    }
    let handle = StorageHandle::new(SqliteStoreConfig::new(&path)).unwrap();
    let Err(err) = handle.open() else {
        panic!("expected version mismatch");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)), "unexpected error: {err:?}");
    assert!(!handle.is_open());
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let Err(err) = StorageHandle::new(SqliteStoreConfig::new(dir.path())) else {
        panic!("directory path must be rejected");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn overlong_path_component_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a".repeat(300)).join("store.db");
    assert!(matches!(
        StorageHandle::new(SqliteStoreConfig::new(path)),
        Err(SqliteStoreError::Invalid(_))
    ));
}

#[test]
fn uncreatable_parent_fails_open() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let handle = StorageHandle::new(SqliteStoreConfig::new(blocker.join("store.db"))).unwrap();
    let Err(err) = handle.open() else {
        panic!("open under a regular file must fail");
    };
    assert!(matches!(err, SqliteStoreError::Io(_)), "unexpected error: {err:?}");
}

#[test]
fn release_memory_is_a_no_op_without_live_connection() {
    let dir = TempDir::new().unwrap();
    let handle = open_handle(&dir);
    handle.release_memory().unwrap();
    std::fs::remove_file(db_path(&dir)).unwrap();
    handle.release_memory().unwrap();
    handle.close().unwrap();
    handle.release_memory().unwrap();
    assert!(!handle.is_open());
}

#[test]
fn only_unavailability_survives_conversion_to_store_error() {
    assert_eq!(
        StoreError::from(SqliteStoreError::Unavailable("gone".to_string())),
        StoreError::Unavailable("gone".to_string())
    );
    let general = [
        SqliteStoreError::Io("io".to_string()),
        SqliteStoreError::Db("database or disk is full".to_string()),
        SqliteStoreError::Invalid("bad".to_string()),
        SqliteStoreError::VersionMismatch("v2".to_string()),
    ];
    for error in general {
        let message = error.to_string();
        assert_eq!(StoreError::from(error), StoreError::General(message));
    }
}
