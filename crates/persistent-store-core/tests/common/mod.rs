// crates/persistent-store-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared store and listener doubles for core tests.
// Purpose: Script backend failures and record listener callbacks.
// Dependencies: persistent-store-core
// ============================================================================

//! ## Overview
//! [`ScriptedStore`] is an in-memory [`Store`] whose next calls can be forced
//! to fail, and whose reopen outcome can be scripted. [`RecordingListener`]
//! captures every notification it receives.

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

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use persistent_store_core::ListenerError;
use persistent_store_core::NotificationHub;
use persistent_store_core::ScopeType;
use persistent_store_core::Store;
use persistent_store_core::StoreError;
use persistent_store_core::StoreListener;
use persistent_store_core::StoredValue;

// ============================================================================
// SECTION: Scripted Store
// ============================================================================

/// In-memory store with scripted failures.
#[derive(Default)]
pub struct ScriptedStore {
    /// Errors returned by the next operations, in order.
    failures: Mutex<VecDeque<StoreError>>,
    /// Outcomes returned by the next `open` calls, in order.
    open_results: Mutex<VecDeque<Result<(), StoreError>>>,
    /// Number of data operations attempted.
    calls: AtomicUsize,
    /// Number of `open` calls.
    opens: AtomicUsize,
    /// Number of `flush_cache` calls.
    flushes: AtomicUsize,
    /// Stored values keyed by namespace and key.
    values: Mutex<BTreeMap<(String, String), String>>,
    /// Listener registry.
    hub: NotificationHub,
}

impl ScriptedStore {
    /// Queues errors for the next data operations.
    pub fn fail_next(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.failures.lock().unwrap().extend(errors);
    }

    /// Queues an outcome for the next `open` call.
    pub fn script_open(&self, result: Result<(), StoreError>) {
        self.open_results.lock().unwrap().push_back(result);
    }

    /// Returns the number of attempted data operations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the number of `open` calls.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Returns the number of `flush_cache` calls.
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Counts a call and pops the next scripted failure.
    fn attempt(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.failures.lock().unwrap().pop_front().map_or(Ok(()), Err)
    }
}

impl Store for ScriptedStore {
    fn open(&self) -> Result<(), StoreError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn set_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
        value: &str,
        _ttl: u32,
    ) -> Result<(), StoreError> {
        self.attempt()?;
        self.values
            .lock()
            .unwrap()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        self.hub.value_changed(scope, namespace, key, value);
        Ok(())
    }

    fn get_value(
        &self,
        _scope: ScopeType,
        namespace: &str,
        key: &str,
    ) -> Result<StoredValue, StoreError> {
        self.attempt()?;
        self.values
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), key.to_string()))
            .map(StoredValue::persistent)
            .ok_or(StoreError::UnknownKey)
    }

    fn delete_key(&self, _scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.attempt()?;
        self.values.lock().unwrap().remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }

    fn delete_namespace(&self, _scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
        self.attempt()?;
        self.values.lock().unwrap().retain(|(ns, _), _| ns != namespace);
        Ok(())
    }

    fn set_namespace_storage_limit(
        &self,
        _scope: ScopeType,
        _namespace: &str,
        _size: u32,
    ) -> Result<(), StoreError> {
        self.attempt()
    }

    fn get_namespace_storage_limit(
        &self,
        _scope: ScopeType,
        _namespace: &str,
    ) -> Result<u32, StoreError> {
        self.attempt()?;
        Ok(1_000)
    }

    fn flush_cache(&self) -> Result<(), StoreError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        self.failures.lock().unwrap().pop_front().map_or(Ok(()), Err)
    }

    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.register(listener)
    }

    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.unregister(listener)
    }
}

// ============================================================================
// SECTION: Recording Listener
// ============================================================================

/// Notification captured by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A value changed.
    Changed {
        /// Notification scope.
        scope: ScopeType,
        /// Namespace name.
        namespace: String,
        /// Key name.
        key: String,
        /// New value.
        value: String,
    },
    /// A byte budget was exhausted.
    Exceeded {
        /// Notification scope.
        scope: ScopeType,
        /// Namespace name.
        namespace: String,
    },
}

/// Listener that records every callback.
#[derive(Default)]
pub struct RecordingListener {
    /// Received events in order.
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    /// Creates a shared recording listener.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl StoreListener for RecordingListener {
    fn value_changed(&self, scope: ScopeType, namespace: &str, key: &str, value: &str) {
        self.events.lock().unwrap().push(Event::Changed {
            scope,
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn storage_exceeded(&self, scope: ScopeType, namespace: &str) {
        self.events.lock().unwrap().push(Event::Exceeded {
            scope,
            namespace: namespace.to_string(),
        });
    }
}

/// Builds a value-changed event.
pub fn changed(scope: ScopeType, namespace: &str, key: &str, value: &str) -> Event {
    Event::Changed {
        scope,
        namespace: namespace.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}
