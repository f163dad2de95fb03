// crates/persistent-store-remote/src/client.rs
// ============================================================================
// Module: Secure Storage Client
// Description: Transport-independent secure-storage RPC contract.
// Purpose: Decouple the remote store from the wire transport.
// Dependencies: crate::wire
// ============================================================================

//! ## Overview
//! One blocking method per remote procedure. Implementations report failures
//! as an [`RpcStatus`] carrying a status code, message, and details.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::wire::DeleteAllValuesRequest;
use crate::wire::DeleteValueRequest;
use crate::wire::GetValueRequest;
use crate::wire::GetValueResponse;
use crate::wire::RpcStatus;
use crate::wire::UpdateValueRequest;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking secure-storage RPC client.
pub trait SecureStorageClient: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns [`RpcStatus`] when the call fails.
    fn get_value(&self, request: &GetValueRequest) -> Result<GetValueResponse, RpcStatus>;

    /// Creates or replaces a value.
    ///
    /// # Errors
    ///
    /// Returns [`RpcStatus`] when the call fails.
    fn update_value(&self, request: &UpdateValueRequest) -> Result<(), RpcStatus>;

    /// Deletes a value.
    ///
    /// # Errors
    ///
    /// Returns [`RpcStatus`] when the call fails.
    fn delete_value(&self, request: &DeleteValueRequest) -> Result<(), RpcStatus>;

    /// Deletes every value of an application in a scope.
    ///
    /// # Errors
    ///
    /// Returns [`RpcStatus`] when the call fails.
    fn delete_all_values(&self, request: &DeleteAllValuesRequest) -> Result<(), RpcStatus>;
}
