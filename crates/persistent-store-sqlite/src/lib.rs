// crates/persistent-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Key-Value Store
// Description: Device-scope store backend using SQLite.
// Purpose: Provide quota-enforced local persistence for namespaced values.
// Dependencies: persistent-store-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate persists device-scope namespaces, keys, and values in a single
//! `SQLite` file. [`StorageHandle`] owns the connection and its lifecycle,
//! [`QuotaEnforcingStore`] layers length rules, byte budgets, TTL expiry, and
//! change notification on top, and [`open_device_store`] assembles the
//! production decorator stack.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod handle;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::SqliteStoreConfig;
pub use config::SqliteStoreMode;
pub use config::SqliteSyncMode;
pub use handle::EntryRecord;
pub use handle::HandleTransaction;
pub use handle::NamespaceRecord;
pub use handle::SqliteStoreError;
pub use handle::StorageHandle;
pub use store::DeviceStore;
pub use store::QuotaEnforcingStore;
pub use store::open_device_store;
