// crates/persistent-store-config/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Process-wide tracing subscriber installation.
// Purpose: Route store events to text or JSON output with level filtering.
// Dependencies: serde, tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` takes precedence over the configured level. The subscriber is
//! global; installing it a second time fails with [`ConfigError::Logging`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Minimum level of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset or invalid.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Include the event target.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: default_with_target(),
        }
    }
}

/// Targets are shown by default.
const fn default_with_target() -> bool {
    true
}

// ============================================================================
// SECTION: Installation
// ============================================================================

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`ConfigError::Logging`] when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let layer = fmt::layer().with_target(config.with_target);
    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::registry().with(filter).with(layer).try_init(),
        LogFormat::Json => tracing_subscriber::registry().with(filter).with(layer.json()).try_init(),
    };
    installed.map_err(|err| ConfigError::Logging(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::LogFormat;
    use super::LogLevel;
    use super::LoggingConfig;

    #[test]
    fn defaults_are_info_text_with_target() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.with_target);
    }

    #[test]
    fn levels_render_filter_directives() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Trace.as_str(), "trace");
    }
}
