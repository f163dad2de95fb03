// crates/persistent-store-core/src/runtime/cache.rs
// ============================================================================
// Module: Caching Layer
// Description: Pass-through decorator exposing the cache flush surface.
// Purpose: Give callers a stable flush entry point above any backend.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The layer holds no cached entries of its own; reads and writes go straight
//! to the inner store. [`Store::flush_cache`] is forwarded so the backend can
//! release whatever it caches; a backend that cannot release anything is
//! logged and the flush still succeeds.

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

/// Pass-through store decorator with a flush entry point.
pub struct CachingLayer<S> {
    /// Wrapped store.
    inner: S,
}

impl<S: Store> CachingLayer<S> {
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
}

impl<S: Store> Store for CachingLayer<S> {
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
        self.inner.set_value(scope, namespace, key, value, ttl)
    }

    fn get_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
    ) -> Result<StoredValue, StoreError> {
        self.inner.get_value(scope, namespace, key)
    }

    fn delete_key(&self, scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.inner.delete_key(scope, namespace, key)
    }

    fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
        self.inner.delete_namespace(scope, namespace)
    }

    fn set_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
        size: u32,
    ) -> Result<(), StoreError> {
        self.inner.set_namespace_storage_limit(scope, namespace, size)
    }

    fn get_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
    ) -> Result<u32, StoreError> {
        self.inner.get_namespace_storage_limit(scope, namespace)
    }

    fn get_keys(&self, scope: ScopeType, namespace: &str) -> Result<Vec<String>, StoreError> {
        self.inner.get_keys(scope, namespace)
    }

    fn get_namespaces(&self, scope: ScopeType) -> Result<Vec<String>, StoreError> {
        self.inner.get_namespaces(scope)
    }

    fn get_storage_sizes(&self, scope: ScopeType) -> Result<Vec<NamespaceSize>, StoreError> {
        self.inner.get_storage_sizes(scope)
    }

    fn flush_cache(&self) -> Result<(), StoreError> {
        tracing::debug!("flushing store cache");
        if let Err(err) = self.inner.flush_cache() {
            tracing::warn!(error = %err, "backend cache release failed");
        }
        Ok(())
    }

    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.inner.register(listener)
    }

    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.inner.unregister(listener)
    }
}
