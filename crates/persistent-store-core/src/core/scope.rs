// crates/persistent-store-core/src/core/scope.rs
// ============================================================================
// Module: Store Scope
// Description: Storage scope selector for store operations.
// Purpose: Distinguish device-local data from account-synced data.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every store operation names a [`ScopeType`]. A backend serves exactly one
//! scope and rejects the other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Storage scope for a store operation.
///
/// # Invariants
/// - Variants are stable for serialization and listener dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    /// Data lives only on this device.
    Device,
    /// Data is attached to the user account and lives on a remote service.
    Account,
}

impl ScopeType {
    /// Returns a stable label for logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Account => "account",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
