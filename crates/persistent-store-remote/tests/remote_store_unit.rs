// crates/persistent-store-remote/tests/remote_store_unit.rs
// ============================================================================
// Module: Remote Secure Store Unit Tests
// Description: Store-to-RPC mapping over a scripted client.
// Purpose: Verify requests, expiry handling, failures, and notifications.
// Dependencies: persistent-store-core, persistent-store-remote, time
// ============================================================================

//! ## Overview
//! Exercises [`RemoteSecureStore`] without a network: a scripted client
//! records every request and replays canned responses or failures.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use persistent_store_core::ListenerError;
use persistent_store_core::ScopeType;
use persistent_store_core::Store;
use persistent_store_core::StoreError;
use persistent_store_core::StoreListener;
use persistent_store_core::core::ttl::unix_seconds;
use persistent_store_remote::DeleteAllValuesRequest;
use persistent_store_remote::DeleteValueRequest;
use persistent_store_remote::GetValueRequest;
use persistent_store_remote::GetValueResponse;
use persistent_store_remote::Key;
use persistent_store_remote::RpcCode;
use persistent_store_remote::RpcStatus;
use persistent_store_remote::Value;
use persistent_store_remote::WireScope;
use time::OffsetDateTime;

use crate::common::Call;
use crate::common::Event;
use crate::common::RecordingListener;
use crate::common::scripted_store;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn account_key(namespace: &str, key: &str) -> Key {
    Key {
        app_id: namespace.to_string(),
        key: key.to_string(),
        scope: WireScope::Account,
    }
}

fn listen(store: &impl Store) -> Arc<RecordingListener> {
    let listener = Arc::new(RecordingListener::default());
    store.register(listener.clone()).unwrap();
    listener
}

// ============================================================================
// SECTION: Writes
// ============================================================================

#[test]
fn set_value_sends_account_key_with_ttl_and_notifies() {
    let store = scripted_store();
    let listener = listen(&store);

    store.set_value(ScopeType::Account, "ns", "k", "v", 60).unwrap();

    let calls = store.client().calls();
    let [Call::Update(request)] = calls.as_slice() else {
        panic!("expected one update, got {calls:?}");
    };
    assert_eq!(request.value.key, Some(account_key("ns", "k")));
    assert_eq!(request.value.value, "v");
    assert_eq!(request.value.ttl, Some(Duration::from_secs(60)));
    assert_eq!(request.value.expire_time, None);
    assert_eq!(
        listener.events(),
        vec![Event::Changed(ScopeType::Account, "ns".into(), "k".into(), "v".into())]
    );
}

#[test]
fn zero_ttl_is_sent_without_ttl() {
    let store = scripted_store();
    store.set_value(ScopeType::Account, "ns", "k", "", 0).unwrap();
    let calls = store.client().calls();
    let [Call::Update(request)] = calls.as_slice() else {
        panic!("expected one update, got {calls:?}");
    };
    assert_eq!(request.value.ttl, None);
    assert_eq!(request.value.value, "");
}

#[test]
fn legacy_flag_notifies_with_device_scope() {
    let store = scripted_store().with_legacy_device_scope_notifications(true);
    let listener = listen(&store);
    assert_eq!(store.notification_scope(), ScopeType::Device);

    store.set_value(ScopeType::Account, "ns", "k", "v", 0).unwrap();

    assert_eq!(
        listener.events(),
        vec![Event::Changed(ScopeType::Device, "ns".into(), "k".into(), "v".into())]
    );
}

#[test]
fn failed_update_is_general_and_silent() {
    let store = scripted_store();
    let listener = listen(&store);
    store.client().fail_with(RpcStatus::new(RpcCode::Unavailable, "down"));

    let Err(err) = store.set_value(ScopeType::Account, "ns", "k", "v", 0) else {
        panic!("expected failure");
    };
    assert!(matches!(err, StoreError::General(_)));
    assert!(listener.events().is_empty());
}

// ============================================================================
// SECTION: Scope
// ============================================================================

#[test]
fn device_scope_is_rejected_without_a_call() {
    let store = scripted_store();
    assert!(matches!(
        store.set_value(ScopeType::Device, "ns", "k", "v", 0),
        Err(StoreError::General(_))
    ));
    assert!(matches!(store.get_value(ScopeType::Device, "ns", "k"), Err(StoreError::General(_))));
    assert!(matches!(store.delete_key(ScopeType::Device, "ns", "k"), Err(StoreError::General(_))));
    assert!(matches!(store.delete_namespace(ScopeType::Device, "ns"), Err(StoreError::General(_))));
    assert!(store.client().calls().is_empty());
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[test]
fn get_value_returns_ttl_verbatim() {
    let store = scripted_store();
    store.client().respond_with(GetValueResponse {
        value: Some(Value {
            value: "v".to_string(),
            ttl: Some(Duration::from_secs(120)),
            ..Value::default()
        }),
    });

    let stored = store.get_value(ScopeType::Account, "ns", "k").unwrap();
    assert_eq!(stored.value, "v");
    assert_eq!(stored.ttl, 120);
    assert_eq!(
        store.client().calls(),
        vec![Call::Get(GetValueRequest {
            key: account_key("ns", "k"),
        })]
    );
}

#[test]
fn get_value_converts_expire_time() {
    let store = scripted_store();
    let expire = OffsetDateTime::from_unix_timestamp(unix_seconds() + 3_600).unwrap();
    store.client().respond_with(GetValueResponse {
        value: Some(Value {
            value: "v".to_string(),
            expire_time: Some(expire),
            ..Value::default()
        }),
    });

    let stored = store.get_value(ScopeType::Account, "ns", "k").unwrap();
    assert!((3_590 ..= 3_600).contains(&stored.ttl), "ttl {}", stored.ttl);
}

#[test]
fn get_value_with_passed_expire_time_is_unknown_key() {
    let store = scripted_store();
    let expire = OffsetDateTime::from_unix_timestamp(unix_seconds() - 10).unwrap();
    store.client().respond_with(GetValueResponse {
        value: Some(Value {
            value: "v".to_string(),
            expire_time: Some(expire),
            ..Value::default()
        }),
    });
    assert_eq!(store.get_value(ScopeType::Account, "ns", "k"), Err(StoreError::UnknownKey));
}

#[test]
fn get_value_without_expiry_is_persistent() {
    let store = scripted_store();
    store.client().respond_with(GetValueResponse {
        value: Some(Value {
            value: "v".to_string(),
            ..Value::default()
        }),
    });
    assert_eq!(store.get_value(ScopeType::Account, "ns", "k").unwrap().ttl, 0);
}

#[test]
fn get_value_without_value_is_general() {
    let store = scripted_store();
    assert!(matches!(store.get_value(ScopeType::Account, "ns", "k"), Err(StoreError::General(_))));
}

#[test]
fn get_value_rpc_failure_is_general() {
    let store = scripted_store();
    store.client().fail_with(RpcStatus::new(RpcCode::NotFound, "missing"));
    assert!(matches!(store.get_value(ScopeType::Account, "ns", "k"), Err(StoreError::General(_))));
}

// ============================================================================
// SECTION: Deletes
// ============================================================================

#[test]
fn deletes_map_to_delete_rpcs() {
    let store = scripted_store();
    store.delete_key(ScopeType::Account, "ns", "k").unwrap();
    store.delete_namespace(ScopeType::Account, "ns").unwrap();
    assert_eq!(
        store.client().calls(),
        vec![
            Call::Delete(DeleteValueRequest {
                key: account_key("ns", "k"),
            }),
            Call::DeleteAll(DeleteAllValuesRequest {
                app_id: "ns".to_string(),
                scope: WireScope::Account,
            }),
        ]
    );
}

#[test]
fn delete_failure_is_general() {
    let store = scripted_store();
    store.client().fail_with(RpcStatus::new(RpcCode::PermissionDenied, "no"));
    assert!(matches!(store.delete_key(ScopeType::Account, "ns", "k"), Err(StoreError::General(_))));
    assert!(matches!(store.delete_namespace(ScopeType::Account, "ns"), Err(StoreError::General(_))));
}

// ============================================================================
// SECTION: Unsupported Operations and Listeners
// ============================================================================

#[test]
fn limits_and_inspection_are_not_supported() {
    let store = scripted_store();
    assert!(matches!(
        store.set_namespace_storage_limit(ScopeType::Account, "ns", 10),
        Err(StoreError::NotSupported(_))
    ));
    assert!(matches!(
        store.get_namespace_storage_limit(ScopeType::Account, "ns"),
        Err(StoreError::NotSupported(_))
    ));
    assert!(matches!(store.get_keys(ScopeType::Account, "ns"), Err(StoreError::NotSupported(_))));
    assert!(matches!(store.get_namespaces(ScopeType::Account), Err(StoreError::NotSupported(_))));
    assert!(matches!(
        store.get_storage_sizes(ScopeType::Account),
        Err(StoreError::NotSupported(_))
    ));
    store.flush_cache().unwrap();
    assert!(store.client().calls().is_empty());
}

#[test]
fn listener_registration_rules_hold() {
    let store = scripted_store();
    let listener: Arc<dyn StoreListener> = Arc::new(RecordingListener::default());
    store.register(Arc::clone(&listener)).unwrap();
    assert_eq!(store.register(Arc::clone(&listener)), Err(ListenerError::AlreadyRegistered));
    store.unregister(&listener).unwrap();
    assert_eq!(store.unregister(&listener), Err(ListenerError::NotRegistered));
}
