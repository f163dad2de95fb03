// crates/persistent-store-config/src/lib.rs
// ============================================================================
// Module: Persistent Store Configuration
// Description: Configuration loading, store assembly, and logging setup.
// Purpose: Turn a config file and environment into ready-to-use stores.
// Dependencies: persistent-store-{core,sqlite,remote}, toml, tracing-subscriber
// ============================================================================

//! ## Overview
//! [`PersistentStoreConfig`] is read from an optional TOML file and then
//! overridden by `PERSISTENTSTORE_*` environment variables. A validated
//! configuration opens the device store and, when an endpoint is
//! configured, the account store, both sharing one notification hub.
//! [`init_logging`] installs the process-wide `tracing` subscriber.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod error;
pub mod logging;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::PersistentStoreConfig;
pub use config::Stores;
pub use env::EnvOverrides;
pub use env::StoreEnv;
pub use error::ConfigError;
pub use logging::LogFormat;
pub use logging::LogLevel;
pub use logging::LoggingConfig;
pub use logging::init_logging;
