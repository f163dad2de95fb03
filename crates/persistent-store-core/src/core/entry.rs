// crates/persistent-store-core/src/core/entry.rs
// ============================================================================
// Module: Store Entry Types
// Description: Values returned by store reads and inspection.
// Purpose: Carry values and remaining TTL back to callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`StoredValue`] is the result of a successful read. [`NamespaceSize`] is
//! one row of the per-namespace usage report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ttl::NO_EXPIRY;

// ============================================================================
// SECTION: Stored Value
// ============================================================================

/// Value read from a store together with its remaining lifetime.
///
/// # Invariants
/// - `ttl == 0` means the entry never expires.
/// - A nonzero `ttl` is the number of whole seconds until expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Stored value. May be empty.
    pub value: String,
    /// Remaining lifetime in seconds, or zero for no expiry.
    pub ttl: u32,
}

impl StoredValue {
    /// Creates a stored value with a remaining TTL.
    #[must_use]
    pub fn new(value: impl Into<String>, ttl: u32) -> Self {
        Self {
            value: value.into(),
            ttl,
        }
    }

    /// Creates a stored value that never expires.
    #[must_use]
    pub fn persistent(value: impl Into<String>) -> Self {
        Self::new(value, NO_EXPIRY)
    }

    /// Returns true when the value carries an expiry.
    #[must_use]
    pub const fn expires(&self) -> bool {
        self.ttl != NO_EXPIRY
    }
}

// ============================================================================
// SECTION: Namespace Size
// ============================================================================

/// Byte usage of a single namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSize {
    /// Namespace name.
    pub namespace: String,
    /// Sum of key and value bytes held by the namespace.
    pub size: u64,
}
