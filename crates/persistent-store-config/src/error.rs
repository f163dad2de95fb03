// crates/persistent-store-config/src/error.rs
// ============================================================================
// Module: Configuration Errors
// Description: Error taxonomy for loading configuration and opening stores.
// Purpose: Report configuration failures with stable variants.
// Dependencies: persistent-store-{core,sqlite,remote}, thiserror
// ============================================================================

//! ## Overview
//! Error taxonomy for loading configuration and opening stores.

// ============================================================================
// SECTION: Imports
// ============================================================================

use persistent_store_core::StoreError;
use persistent_store_remote::RemoteStoreError;
use persistent_store_sqlite::SqliteStoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration and assembly errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Environment variable is malformed.
    #[error("config env error: {0}")]
    Env(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Device store configuration or open failed.
    #[error(transparent)]
    Device(#[from] SqliteStoreError),
    /// Account store configuration or client setup failed.
    #[error(transparent)]
    Account(#[from] RemoteStoreError),
    /// Logging subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}

impl From<ConfigError> for StoreError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Device(inner) => Self::from(inner),
            other => Self::General(other.to_string()),
        }
    }
}
