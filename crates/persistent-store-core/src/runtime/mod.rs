// crates/persistent-store-core/src/runtime/mod.rs
// ============================================================================
// Module: Persistent Store Runtime
// Description: Listener registry and store decorators.
// Purpose: Provide backend-independent building blocks around the store contract.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the pieces that every backend reuses: the
//! [`NotificationHub`] listener registry, the [`ReconnectingStore`] retry
//! decorator, and the [`CachingLayer`] flush surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod notification;
pub mod reconnect;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CachingLayer;
pub use notification::NotificationHub;
pub use reconnect::ReconnectingStore;
