// crates/persistent-store-config/src/config.rs
// ============================================================================
// Module: Persistent Store Config
// Description: Top-level configuration and store assembly.
// Purpose: Load, override, validate, and open the configured stores.
// Dependencies: persistent-store-{core,sqlite,remote}, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Resolution order: the file named by the caller or by
//! `PERSISTENTSTORE_CONFIG`, then environment overrides, then validation.
//! Without a file, `PERSISTENTSTORE_PATH` alone is enough to describe a
//! device store with default budgets.
//!
//! ```toml
//! [device]
//! path = "/var/lib/persistent-store/store.db"
//! max_size = 1000000
//!
//! [account]
//! uri = "localhost:50051"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use persistent_store_core::NotificationHub;
use persistent_store_remote::AccountStore;
use persistent_store_remote::RemoteStoreConfig;
use persistent_store_remote::connect_account_store;
use persistent_store_sqlite::DeviceStore;
use persistent_store_sqlite::SqliteStoreConfig;
use persistent_store_sqlite::open_device_store;
use serde::Deserialize;

use crate::env::EnvOverrides;
use crate::env::StoreEnv;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Complete persistent store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistentStoreConfig {
    /// Device-scope store settings.
    pub device: SqliteStoreConfig,
    /// Account-scope store settings; absent disables the account store.
    #[serde(default)]
    pub account: Option<RemoteStoreConfig>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PersistentStoreConfig {
    /// Creates a configuration with only a device store.
    #[must_use]
    pub fn new(device: SqliteStoreConfig) -> Self {
        Self {
            device,
            account: None,
            logging: LoggingConfig::default(),
        }
    }

    /// Parses a TOML document without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a TOML file without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the size
    /// limit, is not UTF-8, or is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Loads configuration from `path` or the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &EnvOverrides::from_env()?)
    }

    /// Loads configuration from `path` and explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load_with(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Self, ConfigError> {
        let file = path.map(Path::to_path_buf).or_else(|| overrides.config.clone());
        let mut config = match file {
            Some(file) => Self::from_file(&file)?,
            None => {
                let Some(device_path) = overrides.path.clone() else {
                    return Err(ConfigError::Invalid(format!(
                        "no config file given and {} is unset",
                        StoreEnv::Path.as_str()
                    )));
                };
                Self::new(SqliteStoreConfig::new(device_path))
            }
        };
        config.apply_overrides(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides on top of the loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a token is given without any
    /// account endpoint.
    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(path) = &overrides.path {
            self.device.path.clone_from(path);
        }
        if let Some(max_size) = overrides.max_size {
            self.device.max_size = max_size;
        }
        if let Some(max_value) = overrides.max_value {
            self.device.max_value = max_value;
        }
        if let Some(limit) = overrides.limit {
            self.device.limit = limit;
        }
        if let Some(uri) = &overrides.uri {
            match &mut self.account {
                Some(account) => account.uri.clone_from(uri),
                None => self.account = Some(RemoteStoreConfig::new(uri.clone(), None)),
            }
        }
        if let Some(token) = &overrides.token {
            let Some(account) = &mut self.account else {
                return Err(ConfigError::Invalid(format!(
                    "{} requires {}",
                    StoreEnv::Token.as_str(),
                    StoreEnv::Uri.as_str()
                )));
            };
            account.token = Some(token.clone());
        }
        Ok(())
    }

    /// Validates the device and account settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either store configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device.validate()?;
        if let Some(account) = &self.account {
            account.validate()?;
        }
        Ok(())
    }

    /// Opens the configured stores around one shared notification hub.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the device store cannot be opened or the
    /// account client cannot be built.
    pub fn open(&self) -> Result<Stores, ConfigError> {
        self.validate()?;
        let hub = Arc::new(NotificationHub::new());
        let device = open_device_store(self.device.clone(), Arc::clone(&hub))?;
        let account = self
            .account
            .as_ref()
            .map(|account| connect_account_store(account, Arc::clone(&hub)))
            .transpose()?;
        tracing::info!(
            path = %self.device.path.display(),
            account = account.is_some(),
            "persistent stores opened"
        );
        Ok(Stores {
            device,
            account,
            hub,
        })
    }
}

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Opened stores sharing one notification hub.
pub struct Stores {
    /// Device-scope store.
    pub device: DeviceStore,
    /// Account-scope store, when configured.
    pub account: Option<AccountStore>,
    /// Hub notified by both stores.
    pub hub: Arc<NotificationHub>,
}
