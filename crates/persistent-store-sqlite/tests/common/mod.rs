// crates/persistent-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared builders for SQLite store tests.
// Purpose: Create isolated stores with small byte budgets.
// Dependencies: persistent-store-core, persistent-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Stores are created in a fresh temporary directory per test. Budgets are
//! small so that quota edges are reachable with short strings.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use persistent_store_core::NotificationHub;
use persistent_store_core::ScopeType;
use persistent_store_core::StoreListener;
use persistent_store_sqlite::QuotaEnforcingStore;
use persistent_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds a config with explicit budgets.
pub fn config_for_path(path: &Path, max_size: u64, max_value: u32, limit: u32) -> SqliteStoreConfig {
    let mut config = SqliteStoreConfig::new(path);
    config.max_size = max_size;
    config.max_value = max_value;
    config.limit = limit;
    config
}

/// Returns the database path inside `dir`.
pub fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("l1test").join("store.db")
}

/// Opens a store with a 100 byte global budget, 10 byte fields, and a
/// 50 byte default namespace budget.
pub fn small_store(dir: &TempDir) -> QuotaEnforcingStore {
    store_with(dir, 100, 10, 50)
}

/// Opens a store with explicit budgets.
pub fn store_with(dir: &TempDir, max_size: u64, max_value: u32, limit: u32) -> QuotaEnforcingStore {
    let config = config_for_path(&db_path(dir), max_size, max_value, limit);
    QuotaEnforcingStore::new(config, Arc::new(NotificationHub::new())).unwrap()
}

// ============================================================================
// SECTION: Listeners
// ============================================================================

/// Notification captured by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A value changed.
    Changed(ScopeType, String, String, String),
    /// A byte budget was exhausted.
    Exceeded(ScopeType, String),
}

/// Listener that records every callback.
#[derive(Default)]
pub struct RecordingListener {
    /// Received events in order.
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    /// Returns the events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl StoreListener for RecordingListener {
    fn value_changed(&self, scope: ScopeType, namespace: &str, key: &str, value: &str) {
        self.events.lock().unwrap().push(Event::Changed(
            scope,
            namespace.to_string(),
            key.to_string(),
            value.to_string(),
        ));
    }

    fn storage_exceeded(&self, scope: ScopeType, namespace: &str) {
        self.events.lock().unwrap().push(Event::Exceeded(scope, namespace.to_string()));
    }
}
