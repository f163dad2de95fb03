// crates/persistent-store-core/src/runtime/reconnect.rs
// ============================================================================
// Module: Reconnecting Store
// Description: Decorator that reopens the backend once on unavailability.
// Purpose: Recover transparently from a vanished or moved backing store.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Every operation runs once against the inner store. If it fails with
//! [`StoreError::Unavailable`], the inner store is reopened and the operation
//! retried exactly once. A second unavailability, or a failed reopen, is
//! reported as [`StoreError::General`]. All other outcomes pass through
//! unchanged. Cache flushes never reopen: an unavailable backend has nothing
//! cached, so the flush is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::NamespaceSize;
use crate::core::ScopeType;
use crate::core::StoredValue;
use crate::interfaces::ListenerError;
use crate::interfaces::Store;
use crate::interfaces::StoreError;
use crate::interfaces::StoreListener;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Store decorator applying the reopen-and-retry-once policy.
///
/// # Invariants
/// - At most one reopen and one retry per call.
/// - [`StoreError::Unavailable`] never escapes this decorator.
pub struct ReconnectingStore<S> {
    /// Wrapped store.
    inner: S,
}

impl<S: Store> ReconnectingStore<S> {
    /// Wraps a store.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
        }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Runs `call`, reopening and retrying once on unavailability.
    fn with_reconnect<T>(
        &self,
        operation: &'static str,
        call: impl Fn(&S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let reason = match call(&self.inner) {
            Err(StoreError::Unavailable(reason)) => reason,
            other => return other,
        };
        tracing::warn!(operation, reason = %reason, "store unavailable, reopening");
        if let Err(err) = self.inner.open() {
            tracing::error!(operation, error = %err, "store reopen failed");
            return Err(StoreError::General(format!("store reopen failed: {err}")));
        }
        match call(&self.inner) {
            Err(StoreError::Unavailable(reason)) => {
                tracing::error!(operation, reason = %reason, "store unavailable after reopen");
                Err(StoreError::General(format!("store unavailable after reopen: {reason}")))
            }
            other => other,
        }
    }
}

impl<S: Store> Store for ReconnectingStore<S> {
    fn open(&self) -> Result<(), StoreError> {
        self.inner.open()
    }

    fn set_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), StoreError> {
        self.with_reconnect("set_value", |store| store.set_value(scope, namespace, key, value, ttl))
    }

    fn get_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
    ) -> Result<StoredValue, StoreError> {
        self.with_reconnect("get_value", |store| store.get_value(scope, namespace, key))
    }

    fn delete_key(&self, scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.with_reconnect("delete_key", |store| store.delete_key(scope, namespace, key))
    }

    fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
        self.with_reconnect("delete_namespace", |store| store.delete_namespace(scope, namespace))
    }

    fn set_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
        size: u32,
    ) -> Result<(), StoreError> {
        self.with_reconnect("set_namespace_storage_limit", |store| {
            store.set_namespace_storage_limit(scope, namespace, size)
        })
    }

    fn get_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
    ) -> Result<u32, StoreError> {
        self.with_reconnect("get_namespace_storage_limit", |store| {
            store.get_namespace_storage_limit(scope, namespace)
        })
    }

    fn get_keys(&self, scope: ScopeType, namespace: &str) -> Result<Vec<String>, StoreError> {
        self.with_reconnect("get_keys", |store| store.get_keys(scope, namespace))
    }

    fn get_namespaces(&self, scope: ScopeType) -> Result<Vec<String>, StoreError> {
        self.with_reconnect("get_namespaces", |store| store.get_namespaces(scope))
    }

    fn get_storage_sizes(&self, scope: ScopeType) -> Result<Vec<NamespaceSize>, StoreError> {
        self.with_reconnect("get_storage_sizes", |store| store.get_storage_sizes(scope))
    }

    fn flush_cache(&self) -> Result<(), StoreError> {
        match self.inner.flush_cache() {
            Err(StoreError::Unavailable(_)) => Ok(()),
            other => other,
        }
    }

    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.inner.register(listener)
    }

    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.inner.unregister(listener)
    }
}
