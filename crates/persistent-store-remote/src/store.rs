// crates/persistent-store-remote/src/store.rs
// ============================================================================
// Module: Remote Secure Store
// Description: Account-scope Store backed by a secure-storage client.
// Purpose: Map store operations onto secure-storage RPCs.
// Dependencies: persistent-store-core, time, tracing
// ============================================================================

//! ## Overview
//! [`RemoteSecureStore`] serves the account scope only. Namespaces travel as
//! the application identifier of each remote key. Remote expiry is reported
//! back as the remaining lifetime in seconds; a value whose expiry instant
//! has already passed reads as an unknown key.
//!
//! Failed calls are logged with their status code, message, and details and
//! surface as [`StoreError::General`]. Listeners are notified after a
//! successful update.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use persistent_store_core::CachingLayer;
use persistent_store_core::ListenerError;
use persistent_store_core::NO_EXPIRY;
use persistent_store_core::NotificationHub;
use persistent_store_core::ScopeType;
use persistent_store_core::Store;
use persistent_store_core::StoreError;
use persistent_store_core::StoreListener;
use persistent_store_core::StoredValue;
use persistent_store_core::core::ttl::remaining_ttl;
use persistent_store_core::core::ttl::unix_seconds;

use crate::client::SecureStorageClient;
use crate::config::RemoteStoreConfig;
use crate::config::RemoteStoreError;
use crate::http::HttpSecureStorageClient;
use crate::wire::DeleteAllValuesRequest;
use crate::wire::DeleteValueRequest;
use crate::wire::GetValueRequest;
use crate::wire::Key;
use crate::wire::RpcStatus;
use crate::wire::UpdateValueRequest;
use crate::wire::Value;
use crate::wire::WireScope;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Account-scope store as assembled from configuration.
pub type AccountStore = CachingLayer<RemoteSecureStore<HttpSecureStorageClient>>;

/// Store backed by the remote secure-storage service.
///
/// # Invariants
/// - Only [`ScopeType::Account`] requests reach the client.
/// - Listeners are notified only after the remote update succeeded.
pub struct RemoteSecureStore<C> {
    /// Secure-storage client.
    client: C,
    /// Listener registry.
    hub: Arc<NotificationHub>,
    /// Scope reported to listeners on change.
    notification_scope: ScopeType,
}

impl<C: SecureStorageClient> RemoteSecureStore<C> {
    /// Creates a store over `client` that notifies through `hub`.
    #[must_use]
    pub const fn new(client: C, hub: Arc<NotificationHub>) -> Self {
        Self {
            client,
            hub,
            notification_scope: ScopeType::Account,
        }
    }

    /// Reports changes to listeners with device scope when `enabled`.
    #[must_use]
    pub fn with_legacy_device_scope_notifications(mut self, enabled: bool) -> Self {
        self.notification_scope = if enabled { ScopeType::Device } else { ScopeType::Account };
        self
    }

    /// Returns the scope reported to listeners.
    #[must_use]
    pub const fn notification_scope(&self) -> ScopeType {
        self.notification_scope
    }

    /// Returns the secure-storage client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Returns the listener registry.
    #[must_use]
    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }
}

/// Rejects scopes other than account.
fn ensure_account_scope(scope: ScopeType, operation: &str) -> Result<(), StoreError> {
    if scope == ScopeType::Account {
        Ok(())
    } else {
        Err(StoreError::General(format!("{operation} is served for the account scope only")))
    }
}

/// Builds the remote key of `namespace`/`key`.
fn remote_key(namespace: &str, key: &str) -> Key {
    Key {
        app_id: namespace.to_string(),
        key: key.to_string(),
        scope: WireScope::Account,
    }
}

/// Logs a failed call and converts it into a general store failure.
fn rpc_failure(operation: &str, status: RpcStatus) -> StoreError {
    tracing::error!(
        operation,
        code = %status.code,
        message = %status.message,
        details = %status.details_json(),
        "secure storage call failed"
    );
    StoreError::from(status)
}

/// Converts a remote value into a stored value with remaining lifetime.
fn stored_value(value: Value, now: i64) -> Result<StoredValue, StoreError> {
    if let Some(ttl) = value.ttl {
        let seconds = u32::try_from(ttl.as_secs()).unwrap_or(u32::MAX);
        return Ok(StoredValue::new(value.value, seconds));
    }
    let Some(expire_time) = value.expire_time else {
        return Ok(StoredValue::new(value.value, NO_EXPIRY));
    };
    match remaining_ttl(Some(expire_time.unix_timestamp()), now) {
        Some(seconds) => Ok(StoredValue::new(value.value, seconds)),
        None => Err(StoreError::UnknownKey),
    }
}

impl<C: SecureStorageClient> Store for RemoteSecureStore<C> {
    fn set_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), StoreError> {
        ensure_account_scope(scope, "set_value")?;
        let request = UpdateValueRequest {
            value: Value {
                key: Some(remote_key(namespace, key)),
                value: value.to_string(),
                ttl: (ttl != NO_EXPIRY).then(|| Duration::from_secs(u64::from(ttl))),
                expire_time: None,
            },
        };
        self.client.update_value(&request).map_err(|status| rpc_failure("set_value", status))?;
        self.hub.value_changed(self.notification_scope, namespace, key, value);
        Ok(())
    }

    fn get_value(
        &self,
        scope: ScopeType,
        namespace: &str,
        key: &str,
    ) -> Result<StoredValue, StoreError> {
        ensure_account_scope(scope, "get_value")?;
        let request = GetValueRequest {
            key: remote_key(namespace, key),
        };
        let response =
            self.client.get_value(&request).map_err(|status| rpc_failure("get_value", status))?;
        let Some(value) = response.value else {
            tracing::error!(operation = "get_value", "secure storage response carried no value");
            return Err(StoreError::General("get_value response carried no value".to_string()));
        };
        stored_value(value, unix_seconds())
    }

    fn delete_key(&self, scope: ScopeType, namespace: &str, key: &str) -> Result<(), StoreError> {
        ensure_account_scope(scope, "delete_key")?;
        let request = DeleteValueRequest {
            key: remote_key(namespace, key),
        };
        self.client.delete_value(&request).map_err(|status| rpc_failure("delete_key", status))
    }

    fn delete_namespace(&self, scope: ScopeType, namespace: &str) -> Result<(), StoreError> {
        ensure_account_scope(scope, "delete_namespace")?;
        let request = DeleteAllValuesRequest {
            app_id: namespace.to_string(),
            scope: WireScope::Account,
        };
        self.client
            .delete_all_values(&request)
            .map_err(|status| rpc_failure("delete_namespace", status))
    }

    fn register(&self, listener: Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.register(listener)
    }

    fn unregister(&self, listener: &Arc<dyn StoreListener>) -> Result<(), ListenerError> {
        self.hub.unregister(listener)
    }
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Connects the account-scope store described by `config`.
///
/// # Errors
///
/// Returns [`RemoteStoreError`] when the configuration is invalid or the
/// HTTP client cannot be built.
pub fn connect_account_store(
    config: &RemoteStoreConfig,
    hub: Arc<NotificationHub>,
) -> Result<AccountStore, RemoteStoreError> {
    let client = HttpSecureStorageClient::new(config)?;
    let store = RemoteSecureStore::new(client, hub)
        .with_legacy_device_scope_notifications(config.legacy_device_scope_notifications);
    tracing::info!(
        uri = %config.uri,
        local = config.is_local(),
        "account store connected"
    );
    Ok(CachingLayer::new(store))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
