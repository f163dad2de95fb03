// crates/persistent-store-core/src/interfaces/mod.rs
// ============================================================================
// Module: Persistent Store Interfaces
// Description: Backend-agnostic store contract and listener interface.
// Purpose: Define the contract surfaces shared by every store backend.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`Store`] is the single contract implemented by the local and remote
//! backends and by every decorator. Decorators hold an inner [`Store`] and
//! expose the same trait, so they stack by construction.
//!
//! Operations that a backend does not serve fall back to default methods
//! returning [`StoreError::NotSupported`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::NamespaceSize;
use crate::core::ScopeType;
use crate::core::StoredValue;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store operation errors.
///
/// # Invariants
/// - Error messages never embed stored values.
/// - Only [`StoreError::Unavailable`] is retried by
///   [`crate::ReconnectingStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Namespace, key, or value violates a length rule, or a write would
    /// exceed a byte budget.
    #[error("store invalid input length: {0}")]
    InvalidLength(String),
    /// Key is absent or expired in an existing namespace.
    #[error("store unknown key")]
    UnknownKey,
    /// Namespace does not exist.
    #[error("store namespace does not exist")]
    NotExist,
    /// Backing storage is temporarily unusable; reconnecting may help.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Any other failure, including remote call failures and failed
    /// reconnects.
    #[error("store general failure: {0}")]
    General(String),
    /// Underlying write failed.
    #[error("store write error: {0}")]
    Write(String),
    /// Backend does not serve the requested operation.
    #[error("store operation not supported: {0}")]
    NotSupported(String),
}

/// Listener registry errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener is already registered.
    #[error("listener already registered")]
    AlreadyRegistered,
    /// The listener was never registered.
    #[error("listener not registered")]
    NotRegistered,
}

// ============================================================================
// SECTION: Listener
// ============================================================================

/// Receives change notifications from a store.
///
/// Listeners are invoked synchronously on the thread that completed the
/// operation, after the store has released its internal locks.
pub trait StoreListener: Send + Sync {
    /// Called after a value was successfully written.
    fn value_changed(&self, scope: ScopeType, namespace: &str, key: &str, value: &str);

    /// Called when a write was rejected because a byte budget was exhausted.
    fn storage_exceeded(&self, scope: ScopeType, namespace: &str) {
        let _ = (scope, namespace);
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Scoped key-value store contract.
///
/// # Invariants
/// - A successful write is visible to every subsequent read on any thread.
/// - Listeners observe a write only after it is durable.
pub trait Store: Send + Sync {
    /// Opens or reopens the backing storage.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::General`] when the storage cannot be opened.
    fn open(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Stores `value` under `namespace`/`key`, replacing any previous value.
    ///
    /// A `ttl` of zero stores a value that never expires.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when validation, quota checks, or the write
    /// fails.
    fn set_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), StoreError>;

    /// Reads the value stored under `namespace`/`key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotExist`] for an unknown namespace and
    /// [`StoreError::UnknownKey`] for a missing or expired key.
    fn get_value(&self, scope: ScopeType, namespace: &str, key: &str)
    -> Result<StoredValue, StoreError>;

    /// Deletes a single key. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete cannot be performed.
    fn delete_key(&self, scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError>;

    /// Deletes a namespace with all its entries and its limit. Deleting an
    /// absent namespace succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete cannot be performed.
    fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError>;

    /// Sets the byte budget of a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotSupported`] unless the backend enforces
    /// namespace budgets.
    fn set_namespace_storage_limit(
        &self,
        scope: ScopeType,
        namespace: &str,
        size: u32,
    ) -> Result<(), StoreError> {
        let _ = (scope, namespace, size);
        Err(StoreError::NotSupported("namespace storage limits".to_string()))
    }

    /// Returns the byte budget of a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotSupported`] unless the backend enforces
    /// namespace budgets.
    fn get_namespace_storage_limit(&self, scope: ScopeType, namespace: &str)
    -> Result<u32, StoreError> {
        let _ = (scope, namespace);
        Err(StoreError::NotSupported("namespace storage limits".to_string()))
    }

    /// Lists the live keys of a namespace in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotSupported`] unless the backend supports
    /// inspection.
    fn get_keys(&self, scope: ScopeType, namespace: &str) -> Result<Vec<String>, StoreError> {
        let _ = (scope, namespace);
        Err(StoreError::NotSupported("store inspection".to_string()))
    }

    /// Lists all namespaces in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotSupported`] unless the backend supports
    /// inspection.
    fn get_namespaces(&self, scope: ScopeType) -> Result<Vec<String>, StoreError> {
        let _ = scope;
        Err(StoreError::NotSupported("store inspection".to_string()))
    }

    /// Reports the byte usage of every namespace in ascending name order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotSupported`] unless the backend supports
    /// inspection.
    fn get_storage_sizes(&self, scope: ScopeType) -> Result<Vec<NamespaceSize>, StoreError> {
        let _ = scope;
        Err(StoreError::NotSupported("store inspection".to_string()))
    }

    /// Flushes any cached state held by the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot flush.
    fn flush_cache(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Registers a change listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::AlreadyRegistered`] for a duplicate listener.
    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError>;

    /// Unregisters a change listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NotRegistered`] for an unknown listener.
    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError>;
}

// ============================================================================
// SECTION: Pointer Impls
// ============================================================================

/// Forwards the [`Store`] contract through a smart pointer.
macro_rules! forward_store {
    ($pointer:ident) => {
        impl<S: Store + ?Sized> Store for $pointer<S> {
            fn open(&self) -> Result<(), StoreError> {
                (**self).open()
            }

            fn set_value(
                &self,
                scope: ScopeType,
                namespace: &str,
                key: &str,
                value: &str,
                ttl: u32,
            ) -> Result<(), StoreError> {
                (**self).set_value(scope, namespace, key, value, ttl)
            }

            fn get_value(
                &self,
                scope: ScopeType,
                namespace: &str,
                key: &str,
            ) -> Result<StoredValue, StoreError> {
                (**self).get_value(scope, namespace, key)
            }

            fn delete_key(
                &self,
                scope: ScopeType,
                namespace: &str,
                key: &str,
            ) -> Result<(), StoreError> {
                (**self).delete_key(scope, namespace, key)
            }

            fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
                (**self).delete_namespace(scope, namespace)
            }

            fn set_namespace_storage_limit(
                &self,
                scope: ScopeType,
                namespace: &str,
                size: u32,
            ) -> Result<(), StoreError> {
                (**self).set_namespace_storage_limit(scope, namespace, size)
            }

            fn get_namespace_storage_limit(
                &self,
                scope: ScopeType,
                namespace: &str,
            ) -> Result<u32, StoreError> {
                (**self).get_namespace_storage_limit(scope, namespace)
            }

            fn get_keys(&self, scope: ScopeType, namespace: &str) -> Result<Vec<String>, StoreError> {
                (**self).get_keys(scope, namespace)
            }

            fn get_namespaces(&self, scope: ScopeType) -> Result<Vec<String>, StoreError> {
                (**self).get_namespaces(scope)
            }

            fn get_storage_sizes(&self, scope: ScopeType) -> Result<Vec<NamespaceSize>, StoreError> {
                (**self).get_storage_sizes(scope)
            }

            fn flush_cache(&self) -> Result<(), StoreError> {
                (**self).flush_cache()
            }

            fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
                (**self).register(listener)
            }

            fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
                (**self).unregister(listener)
            }
        }
    };
}

forward_store!(Box);
forward_store!(Arc);
