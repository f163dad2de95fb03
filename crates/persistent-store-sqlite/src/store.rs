// crates/persistent-store-sqlite/src/store.rs
// ============================================================================
// Module: Quota Enforcing Store
// Description: Device-scope store with length rules and byte budgets.
// Purpose: Validate, account, expire, and broadcast every local write.
// Dependencies: persistent-store-core, crate::{config, handle}, tracing
// ============================================================================

//! ## Overview
//! [`QuotaEnforcingStore`] implements the [`Store`] contract over a
//! [`StorageHandle`].
//!
//! Accounting:
//! - An entry charges `len(key) + len(value)` bytes to its namespace and to
//!   the global total.
//! - A namespace record charges `len(namespace)` bytes to the global total
//!   once, from its creation until the namespace is deleted.
//!
//! Budget checks and the write share one immediate transaction, so concurrent
//! writers cannot jointly overshoot a budget. Listeners are notified after the
//! transaction commits and the connection lock is released.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use persistent_store_core::CachingLayer;
use persistent_store_core::ListenerError;
use persistent_store_core::NamespaceSize;
use persistent_store_core::NotificationHub;
use persistent_store_core::ReconnectingStore;
use persistent_store_core::ScopeType;
use persistent_store_core::Store;
use persistent_store_core::StoreError;
use persistent_store_core::StoreListener;
use persistent_store_core::StoredValue;
use persistent_store_core::core::ttl::expiry_for_ttl;
use persistent_store_core::core::ttl::remaining_ttl;
use persistent_store_core::core::ttl::unix_seconds;

use crate::config::SqliteStoreConfig;
use crate::handle::EntryRecord;
use crate::handle::SqliteStoreError;
use crate::handle::StorageHandle;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Production decorator stack for the device scope.
pub type DeviceStore = CachingLayer<ReconnectingStore<QuotaEnforcingStore>>;

/// Outcome of a budget-checked write transaction.
enum WriteOutcome {
    /// The write was applied.
    Applied,
    /// The namespace budget would be exceeded.
    NamespaceFull,
    /// The global budget would be exceeded.
    StorageFull,
}

/// Outcome of an entry lookup.
enum Lookup {
    /// The namespace does not exist.
    NoNamespace,
    /// The namespace exists but holds no such key.
    NoKey,
    /// The entry row, possibly expired.
    Found {
        /// Namespace row identifier.
        namespace_id: i64,
        /// Entry row.
        entry: EntryRecord,
    },
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Device-scope store enforcing length rules and byte budgets.
///
/// # Invariants
/// - Global usage never exceeds `max_size` after a successful write.
/// - Namespace usage never exceeds the namespace budget after a successful
///   write.
/// - Expired entries are never returned.
pub struct QuotaEnforcingStore {
    /// Connection owner.
    handle: StorageHandle,
    /// Global byte budget.
    max_size: u64,
    /// Maximum bytes of a namespace name, key, or value.
    max_value: usize,
    /// Budget of namespaces without an explicit limit.
    default_limit: u32,
    /// Listener registry.
    hub: Arc<NotificationHub>,
}

impl QuotaEnforcingStore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the configuration is invalid or the
    /// database cannot be opened.
    pub fn new(
        config: SqliteStoreConfig,
        hub: Arc<NotificationHub>,
    ) -> Result<Self, SqliteStoreError> {
        let max_size = config.max_size;
        let max_value = usize::try_from(config.max_value).unwrap_or(usize::MAX);
        let default_limit = config.limit;
        let handle = StorageHandle::new(config)?;
        handle.open()?;
        Ok(Self {
            handle,
            max_size,
            max_value,
            default_limit,
            hub,
        })
    }

    /// Returns the storage handle.
    #[must_use]
    pub const fn handle(&self) -> &StorageHandle {
        &self.handle
    }

    /// Returns the listener registry.
    #[must_use]
    pub fn hub(&self) -> Arc<NotificationHub> {
        Arc::clone(&self.hub)
    }

    /// Checks a namespace, key, or value against the length rules.
    fn check_length(&self, field: &'static str, text: &str) -> Result<(), StoreError> {
        if text.len() > self.max_value {
            return Err(StoreError::InvalidLength(format!(
                "{field} exceeds {} bytes",
                self.max_value
            )));
        }
        Ok(())
    }

    /// Checks a namespace or key, which must also be non-empty.
    fn check_name(&self, field: &'static str, text: &str) -> Result<(), StoreError> {
        if text.is_empty() {
            return Err(StoreError::InvalidLength(format!("{field} must not be empty")));
        }
        self.check_length(field, text)
    }

    /// Deletes an entry found expired during a read. Failures are logged only.
    fn discard_expired(&self, scope: ScopeType, namespace_id: i64, key: &str, now: i64) {
        let result: Result<bool, SqliteStoreError> = self
            .handle
            .write_transaction(scope, |tx| tx.delete_expired_entry(namespace_id, key, now));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to discard expired entry");
        }
    }
}

impl Store for QuotaEnforcingStore {
    fn open(&self) -> Result<(), StoreError> {
        self.handle.open().map_err(|err| StoreError::General(err.to_string()))
    }

    fn set_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), StoreError> {
        self.check_name("namespace", namespace)?;
        self.check_name("key", key)?;
        self.check_length("value", value)?;
        let now = unix_seconds();
        let expires_at = expiry_for_ttl(ttl, now);
        let entry_bytes = u64::try_from(key.len() + value.len()).unwrap_or(u64::MAX);
        let outcome = self.handle.write_transaction(scope, |tx| {
            tx.purge_expired(now)?;
            let existing = tx.namespace(namespace)?;
            let (old_bytes, namespace_usage, limit, namespace_bytes) = match &existing {
                Some(record) => (
                    tx.entry(record.id, key)?.map_or(0, |entry| entry.size_bytes),
                    tx.namespace_usage(record.id)?,
                    record.limit.unwrap_or(self.default_limit),
                    0,
                ),
                None => {
                    (0, 0, self.default_limit, u64::try_from(namespace.len()).unwrap_or(u64::MAX))
                }
            };
            let projected = namespace_usage.saturating_sub(old_bytes).saturating_add(entry_bytes);
            if projected > u64::from(limit) {
                return Ok::<_, StoreError>(WriteOutcome::NamespaceFull);
            }
            let projected_global = tx
                .global_usage()?
                .saturating_sub(old_bytes)
                .saturating_add(entry_bytes)
                .saturating_add(namespace_bytes);
            if projected_global > self.max_size {
                return Ok(WriteOutcome::StorageFull);
            }
            let namespace_id = match existing {
                Some(record) => record.id,
                None => tx.create_namespace(namespace)?.id,
            };
            tx.put_entry(namespace_id, key, value, expires_at)?;
            Ok(WriteOutcome::Applied)
        })?;
        match outcome {
            WriteOutcome::Applied => {
                self.hub.value_changed(scope, namespace, key, value);
                Ok(())
            }
            WriteOutcome::NamespaceFull => {
                tracing::debug!(namespace, "namespace storage limit reached");
                self.hub.storage_exceeded(scope, namespace);
                Err(StoreError::InvalidLength("namespace storage limit exceeded".to_string()))
            }
            WriteOutcome::StorageFull => {
                tracing::debug!(namespace, "global storage limit reached");
                self.hub.storage_exceeded(scope, namespace);
                Err(StoreError::InvalidLength("global storage limit exceeded".to_string()))
            }
        }
    }

    fn get_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
    ) -> Result<StoredValue, StoreError> {
        self.check_name("namespace", namespace)?;
        self.check_name("key", key)?;
        let now = unix_seconds();
        let lookup = self.handle.read_transaction(scope, |tx| {
            let Some(record) = tx.namespace(namespace)? else {
                return Ok::<_, StoreError>(Lookup::NoNamespace);
            };
            Ok(tx.entry(record.id, key)?.map_or(Lookup::NoKey, |entry| Lookup::Found {
                namespace_id: record.id,
                entry,
            }))
        })?;
        match lookup {
            Lookup::NoNamespace => Err(StoreError::NotExist),
            Lookup::NoKey => Err(StoreError::UnknownKey),
            Lookup::Found {
                namespace_id,
                entry,
            } => {
                if let Some(ttl) = remaining_ttl(entry.expires_at, now) {
                    return Ok(StoredValue::new(entry.value, ttl));
                }
                self.discard_expired(scope, namespace_id, key, now);
                Err(StoreError::UnknownKey)
            }
        }
    }

    fn delete_key(&self, scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.check_name("namespace", namespace)?;
        self.check_name("key", key)?;
        self.handle.write_transaction(scope, |tx| {
            if let Some(record) = tx.namespace(namespace)? {
                tx.delete_entry(record.id, key)?;
            }
            Ok(())
        })
    }

    fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
        self.check_name("namespace", namespace)?;
        self.handle.write_transaction(scope, |tx| {
            tx.delete_namespace(namespace)?;
            Ok(())
        })
    }

    fn set_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
        size: u32,
    ) -> Result<(), StoreError> {
        self.check_name("namespace", namespace)?;
        self.handle.write_transaction(scope, |tx| {
            let namespace_id = match tx.namespace(namespace)? {
                Some(record) => record.id,
                None => {
                    let added = u64::try_from(namespace.len()).unwrap_or(u64::MAX);
                    if tx.global_usage()?.saturating_add(added) > self.max_size {
                        return Err(StoreError::InvalidLength(
                            "global storage limit exceeded".to_string(),
                        ));
                    }
                    tx.create_namespace(namespace)?.id
                }
            };
            tx.set_namespace_limit(namespace_id, size)?;
            Ok(())
        })
    }

    fn get_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
    ) -> Result<u32, StoreError> {
        self.check_name("namespace", namespace)?;
        self.handle.read_transaction(scope, |tx| {
            let Some(record) = tx.namespace(namespace)? else {
                return Err(StoreError::NotExist);
            };
            Ok(record.limit.unwrap_or(self.default_limit))
        })
    }

    fn get_keys(&self, scope: ScopeType, namespace: &str) -> Result<Vec<String>, StoreError> {
        self.check_name("namespace", namespace)?;
        let now = unix_seconds();
        self.handle.read_transaction(scope, |tx| match tx.namespace(namespace)? {
            Some(record) => Ok::<_, StoreError>(tx.keys(record.id, now)?),
            None => Ok(Vec::new()),
        })
    }

    fn get_namespaces(&self, scope: ScopeType) -> Result<Vec<String>, StoreError> {
        self.handle.read_transaction(scope, |tx| Ok::<_, StoreError>(tx.namespaces()?))
    }

    fn get_storage_sizes(&self, scope: ScopeType) -> Result<Vec<NamespaceSize>, StoreError> {
        let now = unix_seconds();
        self.handle.read_transaction(scope, |tx| Ok::<_, StoreError>(tx.namespace_sizes(now)?))
    }

    fn flush_cache(&self) -> Result<(), StoreError> {
        Ok(self.handle.release_memory()?)
    }

    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.register(listener)
    }

    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.unregister(listener)
    }
}

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Opens the device store wrapped in the reconnect and cache decorators.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the store cannot be opened.
pub fn open_device_store(
    config: SqliteStoreConfig,
    hub: Arc<NotificationHub>,
) -> Result<DeviceStore, SqliteStoreError> {
    let store = QuotaEnforcingStore::new(config, hub)?;
    Ok(CachingLayer::new(ReconnectingStore::new(store)))
}
