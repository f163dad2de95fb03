// crates/persistent-store-sqlite/src/handle.rs
// ============================================================================
// Module: SQLite Storage Handle
// Description: Connection lifecycle and transactional row primitives.
// Purpose: Own the SQLite connection and classify its failures.
// Dependencies: persistent-store-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! [`StorageHandle`] owns at most one open connection. Every access runs
//! inside a transaction handed to the caller as a [`HandleTransaction`], which
//! exposes typed read/write/iterate primitives over namespaces and entries.
//!
//! Access while closed, after the backing file vanished from disk, or when
//! `SQLite` reports a moved or unreadable database is classified as
//! [`SqliteStoreError::Unavailable`] so the reconnect decorator can reopen.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use persistent_store_core::NamespaceSize;
use persistent_store_core::ScopeType;
use persistent_store_core::StoreError;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use thiserror::Error;

use crate::config::SqliteStoreConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Extended result code reported when the database file was moved or unlinked.
const SQLITE_READONLY_DBMOVED: i32 = 1032;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding stored values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Filesystem error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Connection is closed or the backing file is gone.
    #[error("sqlite store unavailable: {0}")]
    Unavailable(String),
    /// Invalid configuration or stored data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Unavailable(message) => Self::Unavailable(message),
            other @ (SqliteStoreError::Io(_)
            | SqliteStoreError::Db(_)
            | SqliteStoreError::Invalid(_)
            | SqliteStoreError::VersionMismatch(_)) => Self::General(other.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Namespace row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRecord {
    /// Row identifier.
    pub id: i64,
    /// Explicit byte budget, if one was set.
    pub limit: Option<u32>,
}

/// Entry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Stored value.
    pub value: String,
    /// Key plus value bytes.
    pub size_bytes: u64,
    /// Absolute unix expiry in seconds, if any.
    pub expires_at: Option<i64>,
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Owner of the `SQLite` connection.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
/// - `None` in the connection slot means the handle is closed.
pub struct StorageHandle {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Open connection, if any.
    connection: Mutex<Option<Connection>>,
}

impl StorageHandle {
    /// Creates a closed handle after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when the configuration is invalid.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        config.validate()?;
        Ok(Self {
            config,
            connection: Mutex::new(None),
        })
    }

    /// Returns the handle configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Opens the backing file, creating it and its schema when absent.
    ///
    /// Any previously open connection is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be created, opened,
    /// or initialized.
    pub fn open(&self) -> Result<(), SqliteStoreError> {
        ensure_parent_dir(&self.config.path)?;
        let mut connection = open_connection(&self.config)?;
        initialize_schema(&mut connection)?;
        let previous = self.lock()?.replace(connection);
        tracing::info!(
            path = %self.config.path.display(),
            reopened = previous.is_some(),
            "sqlite store opened"
        );
        Ok(())
    }

    /// Closes the connection. Closing a closed handle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Db`] when the connection lock is poisoned.
    pub fn close(&self) -> Result<(), SqliteStoreError> {
        if self.lock()?.take().is_some() {
            tracing::info!(path = %self.config.path.display(), "sqlite store closed");
        }
        Ok(())
    }

    /// Returns true when a connection is held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.lock().is_ok_and(|guard| guard.is_some())
    }

    /// Runs `operation` in a deferred transaction.
    ///
    /// The transaction commits when `operation` succeeds.
    ///
    /// # Errors
    ///
    /// Returns `operation`'s error or the handle failure converted into `E`.
    pub fn read_transaction<T, E>(
        &self,
        scope: ScopeType,
        operation: impl FnOnce(&HandleTransaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<SqliteStoreError>,
    {
        self.transaction(scope, TransactionBehavior::Deferred, operation)
    }

    /// Runs `operation` in an immediate (write-locked) transaction.
    ///
    /// The transaction commits when `operation` succeeds and rolls back
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `operation`'s error or the handle failure converted into `E`.
    pub fn write_transaction<T, E>(
        &self,
        scope: ScopeType,
        operation: impl FnOnce(&HandleTransaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<SqliteStoreError>,
    {
        self.transaction(scope, TransactionBehavior::Immediate, operation)
    }

    /// Releases page cache memory held by the connection.
    ///
    /// A closed handle or a missing backing file leaves nothing to release.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Db`] when the pragma fails.
    pub fn release_memory(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        // A closed or orphaned connection holds nothing worth releasing.
        let Ok(connection) = self.live_connection(guard.as_ref()) else {
            return Ok(());
        };
        connection.execute_batch("PRAGMA shrink_memory;").map_err(|err| map_db_error(&err))
    }

    /// Shared transaction driver.
    fn transaction<T, E>(
        &self,
        scope: ScopeType,
        behavior: TransactionBehavior,
        operation: impl FnOnce(&HandleTransaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<SqliteStoreError>,
    {
        ensure_device_scope(scope)?;
        let mut guard = self.lock()?;
        self.live_connection(guard.as_ref())?;
        let Some(connection) = guard.as_mut() else {
            return Err(SqliteStoreError::Unavailable("store is closed".to_string()).into());
        };
        let tx = connection
            .transaction_with_behavior(behavior)
            .map_err(|err| map_db_error(&err))?;
        let handle_tx = HandleTransaction {
            tx,
        };
        let value = operation(&handle_tx)?;
        handle_tx.tx.commit().map_err(|err| map_db_error(&err))?;
        Ok(value)
    }

    /// Confirms the connection is open and its file still exists.
    fn live_connection<'a>(
        &self,
        connection: Option<&'a Connection>,
    ) -> Result<&'a Connection, SqliteStoreError> {
        let Some(connection) = connection else {
            return Err(SqliteStoreError::Unavailable("store is closed".to_string()));
        };
        // An unlinked file still accepts reads and writes through the open
        // descriptor, so its loss is only visible to a path check.
        if !self.config.path.exists() {
            return Err(SqliteStoreError::Unavailable("backing file is missing".to_string()));
        }
        Ok(connection)
    }

    /// Locks the connection slot.
    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("sqlite connection mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// Transaction scoped to a single store operation.
pub struct HandleTransaction<'conn> {
    /// Underlying `SQLite` transaction.
    tx: Transaction<'conn>,
}

impl HandleTransaction<'_> {
    /// Looks up a namespace by name.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, SqliteStoreError> {
        let row: Option<(i64, Option<i64>)> = self
            .tx
            .query_row(
                "SELECT id, size_limit FROM namespaces WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| map_db_error(&err))?;
        let Some((id, limit)) = row else {
            return Ok(None);
        };
        let limit = limit
            .map(|limit| {
                u32::try_from(limit)
                    .map_err(|_| SqliteStoreError::Invalid("stored limit out of range".to_string()))
            })
            .transpose()?;
        Ok(Some(NamespaceRecord {
            id,
            limit,
        }))
    }

    /// Creates a namespace record.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the insert fails.
    pub fn create_namespace(&self, name: &str) -> Result<NamespaceRecord, SqliteStoreError> {
        self.tx
            .execute(
                "INSERT INTO namespaces (name, name_bytes) VALUES (?1, ?2)",
                params![name, byte_count(name.len())?],
            )
            .map_err(|err| map_db_error(&err))?;
        Ok(NamespaceRecord {
            id: self.tx.last_insert_rowid(),
            limit: None,
        })
    }

    /// Sets the explicit byte budget of a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the update fails.
    pub fn set_namespace_limit(
        &self,
        namespace_id: i64,
        limit: u32,
    ) -> Result<(), SqliteStoreError> {
        self.tx
            .execute(
                "UPDATE namespaces SET size_limit = ?2 WHERE id = ?1",
                params![namespace_id, i64::from(limit)],
            )
            .map_err(|err| map_db_error(&err))?;
        Ok(())
    }

    /// Deletes a namespace with its entries. Returns true when it existed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn delete_namespace(&self, name: &str) -> Result<bool, SqliteStoreError> {
        let removed = self
            .tx
            .execute("DELETE FROM namespaces WHERE name = ?1", params![name])
            .map_err(|err| map_db_error(&err))?;
        Ok(removed > 0)
    }

    /// Looks up an entry, including expired ones.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn entry(
        &self,
        namespace_id: i64,
        key: &str,
    ) -> Result<Option<EntryRecord>, SqliteStoreError> {
        let row: Option<(String, i64, Option<i64>)> = self
            .tx
            .query_row(
                "SELECT value, size_bytes, expires_at FROM items WHERE ns_id = ?1 AND key = ?2",
                params![namespace_id, key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|err| map_db_error(&err))?;
        let Some((value, size_bytes, expires_at)) = row else {
            return Ok(None);
        };
        Ok(Some(EntryRecord {
            value,
            size_bytes: stored_bytes(size_bytes)?,
            expires_at,
        }))
    }

    /// Inserts or replaces an entry.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn put_entry(
        &self,
        namespace_id: i64,
        key: &str,
        value: &str,
        expires_at: Option<i64>,
    ) -> Result<(), SqliteStoreError> {
        let size_bytes = byte_count(key.len().saturating_add(value.len()))?;
        self.tx
            .execute(
                "INSERT INTO items (ns_id, key, value, size_bytes, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (ns_id, key) DO UPDATE SET
                     value = excluded.value,
                     size_bytes = excluded.size_bytes,
                     expires_at = excluded.expires_at",
                params![namespace_id, key, value, size_bytes, expires_at],
            )
            .map_err(|err| map_db_error(&err))?;
        Ok(())
    }

    /// Deletes an entry. Returns true when it existed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn delete_entry(&self, namespace_id: i64, key: &str) -> Result<bool, SqliteStoreError> {
        let removed = self
            .tx
            .execute("DELETE FROM items WHERE ns_id = ?1 AND key = ?2", params![namespace_id, key])
            .map_err(|err| map_db_error(&err))?;
        Ok(removed > 0)
    }

    /// Deletes an entry only if it has expired by `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn delete_expired_entry(
        &self,
        namespace_id: i64,
        key: &str,
        now: i64,
    ) -> Result<bool, SqliteStoreError> {
        let removed = self
            .tx
            .execute(
                "DELETE FROM items WHERE ns_id = ?1 AND key = ?2 AND expires_at IS NOT NULL AND \
                 expires_at <= ?3",
                params![namespace_id, key, now],
            )
            .map_err(|err| map_db_error(&err))?;
        Ok(removed > 0)
    }

    /// Deletes every entry that has expired by `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn purge_expired(&self, now: i64) -> Result<usize, SqliteStoreError> {
        self.tx
            .execute(
                "DELETE FROM items WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![now],
            )
            .map_err(|err| map_db_error(&err))
    }

    /// Returns the key plus value bytes held by a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn namespace_usage(&self, namespace_id: i64) -> Result<u64, SqliteStoreError> {
        let total: i64 = self
            .tx
            .query_row(
                "SELECT COALESCE(SUM(size_bytes), 0) FROM items WHERE ns_id = ?1",
                params![namespace_id],
                |row| row.get(0),
            )
            .map_err(|err| map_db_error(&err))?;
        stored_bytes(total)
    }

    /// Returns the global usage: namespace name bytes plus all entry bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn global_usage(&self) -> Result<u64, SqliteStoreError> {
        let total: i64 = self
            .tx
            .query_row(
                "SELECT (SELECT COALESCE(SUM(name_bytes), 0) FROM namespaces)
                      + (SELECT COALESCE(SUM(size_bytes), 0) FROM items)",
                params![],
                |row| row.get(0),
            )
            .map_err(|err| map_db_error(&err))?;
        stored_bytes(total)
    }

    /// Lists live keys of a namespace in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn keys(&self, namespace_id: i64, now: i64) -> Result<Vec<String>, SqliteStoreError> {
        let mut statement = self
            .tx
            .prepare(
                "SELECT key FROM items WHERE ns_id = ?1 AND (expires_at IS NULL OR expires_at > \
                 ?2) ORDER BY key",
            )
            .map_err(|err| map_db_error(&err))?;
        let rows = statement
            .query_map(params![namespace_id, now], |row| row.get(0))
            .map_err(|err| map_db_error(&err))?;
        rows.collect::<Result<Vec<String>, _>>().map_err(|err| map_db_error(&err))
    }

    /// Lists namespace names in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn namespaces(&self) -> Result<Vec<String>, SqliteStoreError> {
        let mut statement = self
            .tx
            .prepare("SELECT name FROM namespaces ORDER BY name")
            .map_err(|err| map_db_error(&err))?;
        let rows =
            statement.query_map(params![], |row| row.get(0)).map_err(|err| map_db_error(&err))?;
        rows.collect::<Result<Vec<String>, _>>().map_err(|err| map_db_error(&err))
    }

    /// Reports live key plus value bytes per namespace.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn namespace_sizes(&self, now: i64) -> Result<Vec<NamespaceSize>, SqliteStoreError> {
        let mut statement = self
            .tx
            .prepare(
                "SELECT n.name, COALESCE(SUM(i.size_bytes), 0)
                 FROM namespaces n
                 LEFT JOIN items i
                     ON i.ns_id = n.id AND (i.expires_at IS NULL OR i.expires_at > ?1)
                 GROUP BY n.id
                 ORDER BY n.name",
            )
            .map_err(|err| map_db_error(&err))?;
        let rows = statement
            .query_map(params![now], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|err| map_db_error(&err))?;
        let mut sizes = Vec::new();
        for row in rows {
            let (namespace, size) = row.map_err(|err| map_db_error(&err))?;
            sizes.push(NamespaceSize {
                namespace,
                size: stored_bytes(size)?,
            });
        }
        Ok(sizes)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects scopes the local store does not serve.
fn ensure_device_scope(scope: ScopeType) -> Result<(), SqliteStoreError> {
    if scope == ScopeType::Device {
        return Ok(());
    }
    Err(SqliteStoreError::Invalid(format!("scope {scope} is not served by the local store")))
}

/// Classifies an `SQLite` failure.
fn map_db_error(err: &rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = err {
        if failure.extended_code == SQLITE_READONLY_DBMOVED
            || matches!(
                failure.code,
                ErrorCode::CannotOpen | ErrorCode::SystemIoFailure | ErrorCode::NotADatabase
            )
        {
            return SqliteStoreError::Unavailable(err.to_string());
        }
    }
    SqliteStoreError::Db(err.to_string())
}

/// Converts a byte count into an `SQLite` integer.
fn byte_count(bytes: usize) -> Result<i64, SqliteStoreError> {
    i64::try_from(bytes).map_err(|_| SqliteStoreError::Invalid("byte count too large".to_string()))
}

/// Converts a stored byte count back into `u64`.
fn stored_bytes(bytes: i64) -> Result<u64, SqliteStoreError> {
    u64::try_from(bytes).map_err(|_| SqliteStoreError::Invalid("negative stored size".to_string()))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS namespaces (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    name_bytes INTEGER NOT NULL,
                    size_limit INTEGER
                );
                CREATE TABLE IF NOT EXISTS items (
                    ns_id INTEGER NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    size_bytes INTEGER NOT NULL,
                    expires_at INTEGER,
                    PRIMARY KEY (ns_id, key),
                    FOREIGN KEY (ns_id) REFERENCES namespaces(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_items_expiry
                    ON items (expires_at) WHERE expires_at IS NOT NULL;",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
