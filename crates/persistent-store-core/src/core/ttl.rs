// crates/persistent-store-core/src/core/ttl.rs
// ============================================================================
// Module: TTL Helpers
// Description: Conversions between relative TTLs and absolute expiries.
// Purpose: Keep expiry arithmetic identical across store backends.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Callers speak in relative TTL seconds; backends persist absolute unix
//! expiries. An entry whose expiry is at or before now is logically absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// TTL value meaning "never expires".
pub const NO_EXPIRY: u32 = 0;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix epoch in seconds.
#[must_use]
pub fn unix_seconds() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_secs()).unwrap_or(i64::MAX)
}

/// Resolves a relative TTL into an absolute expiry.
///
/// Returns `None` for [`NO_EXPIRY`].
#[must_use]
pub fn expiry_for_ttl(ttl: u32, now: i64) -> Option<i64> {
    (ttl != NO_EXPIRY).then(|| now.saturating_add(i64::from(ttl)))
}

/// Returns the remaining TTL for an absolute expiry.
///
/// Returns `None` when the entry has expired, `Some(0)` when it never expires.
#[must_use]
pub fn remaining_ttl(expires_at: Option<i64>, now: i64) -> Option<u32> {
    match expires_at {
        None => Some(NO_EXPIRY),
        Some(at) if at <= now => None,
        Some(at) => Some(u32::try_from(at - now).unwrap_or(u32::MAX)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
