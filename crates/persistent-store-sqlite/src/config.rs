// crates/persistent-store-sqlite/src/config.rs
// ============================================================================
// Module: SQLite Store Config
// Description: Configuration for the device-scope SQLite store.
// Purpose: Describe file location, byte budgets, and SQLite pragmas.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`SqliteStoreConfig`] deserializes from the `[device]` table of the
//! service configuration. Every field except `path` has a default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::handle::SqliteStoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default global byte budget.
pub const DEFAULT_MAX_SIZE: u64 = 1_000_000;
/// Default maximum bytes of a namespace, key, or value.
pub const DEFAULT_MAX_VALUE: u32 = 1_000;
/// Default per-namespace byte budget.
pub const DEFAULT_NAMESPACE_LIMIT: u32 = 10_000;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Modes
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// Rollback journal deleted after each transaction.
    #[default]
    Delete,
    /// WAL journal mode.
    Wal,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Wal => "wal",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the device-scope `SQLite` store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `max_size`, `max_value`, and `limit` are byte counts greater than zero.
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Global byte budget across all namespaces.
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Maximum bytes of a single namespace name, key, or value.
    #[serde(default = "default_max_value")]
    pub max_value: u32,
    /// Byte budget of namespaces without an explicit limit.
    #[serde(default = "default_namespace_limit")]
    pub limit: u32,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration for `path` with default budgets.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: DEFAULT_MAX_SIZE,
            max_value: DEFAULT_MAX_VALUE,
            limit: DEFAULT_NAMESPACE_LIMIT,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }

    /// Validates budgets and the database path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when a budget is zero or the path
    /// is unusable.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        if self.max_size == 0 {
            return Err(SqliteStoreError::Invalid("max_size must be greater than zero".to_string()));
        }
        if self.max_value == 0 {
            return Err(SqliteStoreError::Invalid(
                "max_value must be greater than zero".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(SqliteStoreError::Invalid("limit must be greater than zero".to_string()));
        }
        validate_store_path(&self.path)
    }
}

/// Returns the default global byte budget.
const fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

/// Returns the default field length limit.
const fn default_max_value() -> u32 {
    DEFAULT_MAX_VALUE
}

/// Returns the default per-namespace byte budget.
const fn default_namespace_limit() -> u32 {
    DEFAULT_NAMESPACE_LIMIT
}

/// Returns the default busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
