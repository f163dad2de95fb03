// crates/persistent-store-remote/src/lib.rs
// ============================================================================
// Module: Remote Secure Store
// Description: Account-scope store backend over the secure-storage RPC service.
// Purpose: Translate store operations into remote secure-storage calls.
// Dependencies: persistent-store-core, reqwest, serde, time, url
// ============================================================================

//! ## Overview
//! The remote backend serves the account scope. [`RemoteSecureStore`]
//! translates each [`persistent_store_core::Store`] call into a request on a
//! [`SecureStorageClient`]; [`HttpSecureStorageClient`] carries those requests
//! as JSON over HTTP. Transport failures surface as general store failures
//! after being logged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod config;
pub mod http;
pub mod store;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::SecureStorageClient;
pub use config::RemoteStoreConfig;
pub use config::RemoteStoreError;
pub use http::HttpSecureStorageClient;
pub use store::AccountStore;
pub use store::RemoteSecureStore;
pub use store::connect_account_store;
pub use wire::DeleteAllValuesRequest;
pub use wire::DeleteValueRequest;
pub use wire::GetValueRequest;
pub use wire::GetValueResponse;
pub use wire::Key;
pub use wire::RpcCode;
pub use wire::RpcStatus;
pub use wire::UpdateValueRequest;
pub use wire::Value;
pub use wire::WireScope;
