// crates/persistent-store-core/src/runtime/notification.rs
// ============================================================================
// Module: Notification Hub
// Description: Thread-safe registry of store change listeners.
// Purpose: Broadcast value changes to every registered listener.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! The hub owns a list of [`StoreListener`] handles. Broadcasts snapshot the
//! list under the lock and invoke listeners after releasing it, so a listener
//! may call back into the store or the hub without deadlocking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::core::ScopeType;
use crate::interfaces::ListenerError;
use crate::interfaces::StoreListener;

// ============================================================================
// SECTION: Hub
// ============================================================================

/// Registry of change listeners.
///
/// # Invariants
/// - A listener handle appears at most once.
/// - Listener identity is the address of the shared allocation.
#[derive(Default)]
pub struct NotificationHub {
    /// Registered listeners in registration order.
    listeners: Mutex<Vec<Arc<dyn StoreListener>>>,
}

impl NotificationHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::AlreadyRegistered`] when the same handle is
    /// already present.
    pub fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        let mut listeners = self.lock();
        if listeners.iter().any(|existing| same_listener(existing, &listener)) {
            return Err(ListenerError::AlreadyRegistered);
        }
        listeners.push(listener);
        drop(listeners);
        tracing::debug!("store listener registered");
        Ok(())
    }

    /// Removes a listener.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NotRegistered`] when the handle is unknown.
    pub fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        let mut listeners = self.lock();
        let Some(index) = listeners.iter().position(|existing| same_listener(existing, listener))
        else {
            return Err(ListenerError::NotRegistered);
        };
        listeners.remove(index);
        drop(listeners);
        tracing::debug!("store listener unregistered");
        Ok(())
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Broadcasts a value change to every listener.
    pub fn value_changed(&self, scope: ScopeType, namespace: &str, key: &str, value: &str) {
        for listener in self.snapshot() {
            listener.value_changed(scope, namespace, key, value);
        }
    }

    /// Broadcasts an exhausted byte budget to every listener.
    pub fn storage_exceeded(&self, scope: ScopeType, namespace: &str) {
        for listener in self.snapshot() {
            listener.storage_exceeded(scope, namespace);
        }
    }

    /// Copies the listener list so dispatch runs without the lock.
    fn snapshot(&self) -> Vec<Arc<dyn StoreListener>> {
        self.lock().clone()
    }

    /// Locks the listener list, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn StoreListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Compares listener handles by allocation address, ignoring vtables.
fn same_listener(left: &Arc<dyn StoreListener>, right: &Arc<dyn StoreListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}
