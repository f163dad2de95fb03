// crates/persistent-store-remote/src/config.rs
// ============================================================================
// Module: Remote Store Configuration
// Description: Endpoint, credential, and notification settings.
// Purpose: Validate how the account store reaches the secure-storage service.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! Local endpoints (`localhost`, `127.0.0.1`, `0.0.0.0`, `::1`) are reached
//! over cleartext HTTP without credentials. Every other endpoint requires
//! TLS and a bearer token. An endpoint given as bare `host:port` gets its
//! scheme from that rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "persistent-store/0.1";

/// Hosts reached without TLS or credentials.
const LOCAL_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "0.0.0.0", "::1"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Remote backend setup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteStoreError {
    /// Configuration is invalid.
    #[error("remote store config invalid: {0}")]
    Invalid(String),
    /// HTTP client could not be built.
    #[error("remote store client error: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Remote secure-storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteStoreConfig {
    /// Service endpoint, either a URL or bare `host:port`.
    pub uri: String,
    /// Bearer token; required for non-local endpoints.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in milliseconds; `None` keeps the client default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Notify listeners with device scope instead of account scope.
    #[serde(default)]
    pub legacy_device_scope_notifications: bool,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl RemoteStoreConfig {
    /// Creates a configuration for `uri` with optional `token`.
    #[must_use]
    pub fn new(uri: impl Into<String>, token: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            token,
            timeout_ms: None,
            legacy_device_scope_notifications: false,
            user_agent: default_user_agent(),
        }
    }

    /// Resolves the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Invalid`] for an unparseable endpoint or a
    /// scheme other than `http` or `https`.
    pub fn endpoint(&self) -> Result<Url, RemoteStoreError> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return Err(RemoteStoreError::Invalid("uri is empty".to_string()));
        }
        let text = if uri.contains("://") {
            uri.to_string()
        } else if is_local_host(host_of(uri)) {
            format!("http://{uri}")
        } else {
            format!("https://{uri}")
        };
        let url = Url::parse(&text)
            .map_err(|err| RemoteStoreError::Invalid(format!("uri {uri}: {err}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RemoteStoreError::Invalid(format!("unsupported scheme {other}")));
            }
        }
        if url.host_str().is_none() {
            return Err(RemoteStoreError::Invalid(format!("uri {uri} has no host")));
        }
        Ok(url)
    }

    /// Returns true when the endpoint is a local host.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.endpoint().is_ok_and(|url| url.host_str().is_some_and(is_local_host))
    }

    /// Validates endpoint and credential rules.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError::Invalid`] when a non-local endpoint lacks
    /// TLS or a token.
    pub fn validate(&self) -> Result<(), RemoteStoreError> {
        let url = self.endpoint()?;
        if url.host_str().is_some_and(is_local_host) {
            return Ok(());
        }
        if url.scheme() != "https" {
            return Err(RemoteStoreError::Invalid(
                "non-local endpoints require https".to_string(),
            ));
        }
        if self.token.as_deref().is_none_or(|token| token.trim().is_empty()) {
            return Err(RemoteStoreError::Invalid(
                "non-local endpoints require a token".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Extracts the host part of a bare `host:port` endpoint.
fn host_of(authority: &str) -> &str {
    if authority.starts_with('[') {
        return authority.split_once(']').map_or(authority, |(host, _)| host);
    }
    authority.rsplit_once(':').map_or(authority, |(host, _)| host)
}

/// Returns true for hosts reached without TLS or credentials.
fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    LOCAL_HOSTS.iter().any(|local| local.eq_ignore_ascii_case(host))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
