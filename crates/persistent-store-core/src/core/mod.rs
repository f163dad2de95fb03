// crates/persistent-store-core/src/core/mod.rs
// ============================================================================
// Module: Persistent Store Core Types
// Description: Scope, stored value, and TTL primitives.
// Purpose: Provide stable value types shared by every store backend.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are the vocabulary of the store contract. They carry no backend
//! specifics; both the local `SQLite` backend and the remote secure-storage
//! backend translate into and out of these types.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod entry;
pub mod scope;
pub mod ttl;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entry::NamespaceSize;
pub use entry::StoredValue;
pub use scope::ScopeType;
pub use ttl::NO_EXPIRY;
