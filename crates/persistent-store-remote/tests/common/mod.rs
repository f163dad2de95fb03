// crates/persistent-store-remote/tests/common/mod.rs
// ============================================================================
// Module: Remote Store Test Helpers
// Description: Scripted secure-storage client and recording listener.
// Purpose: Share fixtures between remote store test suites.
// Dependencies: persistent-store-core, persistent-store-remote
// ============================================================================

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

use std::sync::Arc;
use std::sync::Mutex;

use persistent_store_core::NotificationHub;
use persistent_store_core::ScopeType;
use persistent_store_core::StoreListener;
use persistent_store_remote::DeleteAllValuesRequest;
use persistent_store_remote::DeleteValueRequest;
use persistent_store_remote::GetValueRequest;
use persistent_store_remote::GetValueResponse;
use persistent_store_remote::RemoteSecureStore;
use persistent_store_remote::RpcStatus;
use persistent_store_remote::SecureStorageClient;
use persistent_store_remote::UpdateValueRequest;

// ============================================================================
// SECTION: Scripted Client
// ============================================================================

/// Request observed by the scripted client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(GetValueRequest),
    Update(UpdateValueRequest),
    Delete(DeleteValueRequest),
    DeleteAll(DeleteAllValuesRequest),
}

/// Client that records requests and replays scripted outcomes.
#[derive(Default)]
pub struct ScriptedClient {
    calls: Mutex<Vec<Call>>,
    get_response: Mutex<GetValueResponse>,
    failure: Mutex<Option<RpcStatus>>,
}

impl ScriptedClient {
    /// Sets the response returned by `get_value`.
    pub fn respond_with(&self, response: GetValueResponse) {
        *self.get_response.lock().unwrap() = response;
    }

    /// Makes every subsequent call fail with `status`.
    pub fn fail_with(&self, status: RpcStatus) {
        *self.failure.lock().unwrap() = Some(status);
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), RpcStatus> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

impl SecureStorageClient for ScriptedClient {
    fn get_value(&self, request: &GetValueRequest) -> Result<GetValueResponse, RpcStatus> {
        self.record(Call::Get(request.clone()))?;
        Ok(self.get_response.lock().unwrap().clone())
    }

    fn update_value(&self, request: &UpdateValueRequest) -> Result<(), RpcStatus> {
        self.record(Call::Update(request.clone()))
    }

    fn delete_value(&self, request: &DeleteValueRequest) -> Result<(), RpcStatus> {
        self.record(Call::Delete(request.clone()))
    }

    fn delete_all_values(&self, request: &DeleteAllValuesRequest) -> Result<(), RpcStatus> {
        self.record(Call::DeleteAll(request.clone()))
    }
}

/// Creates a remote store over a fresh scripted client.
pub fn scripted_store() -> RemoteSecureStore<ScriptedClient> {
    RemoteSecureStore::new(ScriptedClient::default(), Arc::new(NotificationHub::new()))
}

// ============================================================================
// SECTION: Listener
// ============================================================================

/// Notification observed by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Changed(ScopeType, String, String, String),
    Exceeded(ScopeType, String),
}

/// Listener that records every notification.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
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
