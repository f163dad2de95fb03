// crates/persistent-store-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: `PERSISTENTSTORE_*` environment variables.
// Purpose: Parse environment overrides with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Set-but-empty values and unparseable numbers fail
//! closed. Parsing goes through a lookup function so callers can supply an
//! environment other than the process one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys recognized by the store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEnv {
    /// Configuration file path.
    Config,
    /// Device database path.
    Path,
    /// Global byte budget of the device store.
    MaxSize,
    /// Maximum field length of the device store.
    MaxValue,
    /// Default per-namespace byte budget of the device store.
    Limit,
    /// Secure-storage endpoint of the account store.
    Uri,
    /// Secure-storage bearer token.
    Token,
}

impl StoreEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "PERSISTENTSTORE_CONFIG",
            Self::Path => "PERSISTENTSTORE_PATH",
            Self::MaxSize => "PERSISTENTSTORE_MAXSIZE",
            Self::MaxValue => "PERSISTENTSTORE_MAXVALUE",
            Self::Limit => "PERSISTENTSTORE_LIMIT",
            Self::Uri => "PERSISTENTSTORE_URI",
            Self::Token => "PERSISTENTSTORE_TOKEN",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Configuration file path.
    pub config: Option<PathBuf>,
    /// Device database path.
    pub path: Option<PathBuf>,
    /// Global byte budget.
    pub max_size: Option<u64>,
    /// Maximum field length.
    pub max_value: Option<u32>,
    /// Default per-namespace byte budget.
    pub limit: Option<u32>,
    /// Secure-storage endpoint.
    pub uri: Option<String>,
    /// Secure-storage bearer token.
    pub token: Option<String>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a value is not valid UTF-8, is
    /// empty, or does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Reads overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a value is not valid UTF-8, is
    /// empty, or does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let read = |var: StoreEnv| read_env_nonempty(&lookup, var);
        Ok(Self {
            config: read(StoreEnv::Config)?.map(PathBuf::from),
            path: read(StoreEnv::Path)?.map(PathBuf::from),
            max_size: read(StoreEnv::MaxSize)?
                .map(|raw| parse_number(StoreEnv::MaxSize, &raw))
                .transpose()?,
            max_value: read(StoreEnv::MaxValue)?
                .map(|raw| parse_number(StoreEnv::MaxValue, &raw))
                .transpose()?,
            limit: read(StoreEnv::Limit)?
                .map(|raw| parse_number(StoreEnv::Limit, &raw))
                .transpose()?,
            uri: read(StoreEnv::Uri)?,
            token: read(StoreEnv::Token)?,
        })
    }

    /// Returns true when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a variable, enforcing UTF-8 and rejecting empty values.
fn read_env_nonempty<F>(lookup: &F, var: StoreEnv) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let name = var.as_str();
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value = raw
        .into_string()
        .map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Env(format!("{name} must not be empty")));
    }
    Ok(Some(value))
}

/// Parses an unsigned number.
fn parse_number<T: FromStr>(var: StoreEnv, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Env(format!("{} must be an unsigned integer", var.as_str())))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
