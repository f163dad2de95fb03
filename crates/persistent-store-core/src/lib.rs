// crates/persistent-store-core/src/lib.rs
// ============================================================================
// Module: Persistent Store Core Library
// Description: Public API surface for the persistent store core.
// Purpose: Expose the store contract, value types, and store decorators.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Persistent store core defines the scoped key-value contract shared by the
//! device-local and account-remote backends, the listener registry used to
//! broadcast value changes, and the decorators (reconnect, cache) that wrap
//! any backend behind the same [`Store`] trait.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::NO_EXPIRY;
pub use crate::core::NamespaceSize;
pub use crate::core::ScopeType;
pub use crate::core::StoredValue;
pub use interfaces::ListenerError;
pub use interfaces::Store;
pub use interfaces::StoreError;
pub use interfaces::StoreListener;
pub use runtime::CachingLayer;
pub use runtime::NotificationHub;
pub use runtime::ReconnectingStore;
