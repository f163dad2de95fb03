// crates/persistent-store-remote/src/wire.rs
// ============================================================================
// Module: Secure Storage Wire Types
// Description: Request, response, and status messages of the remote service.
// Purpose: Encode secure-storage messages in their canonical JSON mapping.
// Dependencies: persistent-store-core, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Messages follow the canonical JSON mapping of the secure-storage service:
//! field names are lowerCamelCase, enums travel by name, durations are
//! decimal seconds suffixed with `s`, and timestamps are RFC 3339 strings.
//! Optional fields are omitted when unset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use persistent_store_core::StoreError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Keys and Values
// ============================================================================

/// Visibility scope on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WireScope {
    /// Scope left unset by the sender.
    #[default]
    #[serde(rename = "SCOPE_UNSPECIFIED")]
    Unspecified,
    /// Visible to every device of the account.
    #[serde(rename = "SCOPE_ACCOUNT")]
    Account,
    /// Visible to one device only.
    #[serde(rename = "SCOPE_DEVICE")]
    Device,
}

/// Address of a remote value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    /// Application identifier; carries the store namespace.
    #[serde(default)]
    pub app_id: String,
    /// Key within the application.
    #[serde(default)]
    pub key: String,
    /// Visibility scope.
    #[serde(default)]
    pub scope: WireScope,
}

/// Remote value with optional expiry.
///
/// # Invariants
/// - Senders set at most one of `ttl` and `expire_time`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    /// Address of the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Stored text.
    #[serde(default)]
    pub value: String,
    /// Relative lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "proto_duration")]
    pub ttl: Option<Duration>,
    /// Absolute expiry instant.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "proto_timestamp")]
    pub expire_time: Option<OffsetDateTime>,
}

// ============================================================================
// SECTION: Requests and Responses
// ============================================================================

/// `GetValue` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValueRequest {
    /// Value to read.
    pub key: Key,
}

/// `GetValue` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetValueResponse {
    /// Value read; absent when the service returned none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// `UpdateValue` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateValueRequest {
    /// Value to write.
    pub value: Value,
}

/// `DeleteValue` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteValueRequest {
    /// Value to delete.
    pub key: Key,
}

/// `DeleteAllValues` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllValuesRequest {
    /// Application whose values are deleted.
    pub app_id: String,
    /// Scope whose values are deleted.
    pub scope: WireScope,
}

// ============================================================================
// SECTION: Status
// ============================================================================

/// Canonical RPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RpcCode {
    /// Not an error.
    Ok,
    /// Operation was cancelled.
    Cancelled,
    /// Unknown error.
    Unknown,
    /// Client sent an invalid argument.
    InvalidArgument,
    /// Deadline expired before completion.
    DeadlineExceeded,
    /// Entity not found.
    NotFound,
    /// Entity already exists.
    AlreadyExists,
    /// Caller lacks permission.
    PermissionDenied,
    /// Resource exhausted.
    ResourceExhausted,
    /// System not in a state required for the operation.
    FailedPrecondition,
    /// Operation aborted.
    Aborted,
    /// Operation attempted past the valid range.
    OutOfRange,
    /// Operation not implemented.
    Unimplemented,
    /// Internal error.
    Internal,
    /// Service unavailable.
    Unavailable,
    /// Unrecoverable data loss.
    DataLoss,
    /// Caller is not authenticated.
    Unauthenticated,
}

impl RpcCode {
    /// Returns the canonical code name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Maps an HTTP status onto the closest RPC code.
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            200 ..= 299 => Self::Ok,
            400 => Self::InvalidArgument,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            409 => Self::Aborted,
            429 => Self::ResourceExhausted,
            499 => Self::Cancelled,
            501 => Self::Unimplemented,
            502 | 503 => Self::Unavailable,
            504 => Self::DeadlineExceeded,
            500 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

impl From<i32> for RpcCode {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Cancelled,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }
}

impl From<RpcCode> for i32 {
    fn from(code: RpcCode) -> Self {
        match code {
            RpcCode::Ok => 0,
            RpcCode::Cancelled => 1,
            RpcCode::Unknown => 2,
            RpcCode::InvalidArgument => 3,
            RpcCode::DeadlineExceeded => 4,
            RpcCode::NotFound => 5,
            RpcCode::AlreadyExists => 6,
            RpcCode::PermissionDenied => 7,
            RpcCode::ResourceExhausted => 8,
            RpcCode::FailedPrecondition => 9,
            RpcCode::Aborted => 10,
            RpcCode::OutOfRange => 11,
            RpcCode::Unimplemented => 12,
            RpcCode::Internal => 13,
            RpcCode::Unavailable => 14,
            RpcCode::DataLoss => 15,
            RpcCode::Unauthenticated => 16,
        }
    }
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed RPC outcome.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("rpc failed with {code}: {message}")]
pub struct RpcStatus {
    /// Status code.
    pub code: RpcCode,
    /// Human-readable message from the service or transport.
    #[serde(default)]
    pub message: String,
    /// Structured error details as sent by the service.
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl RpcStatus {
    /// Creates a status without details.
    #[must_use]
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Renders the details as a compact JSON array for logging.
    #[must_use]
    pub fn details_json(&self) -> String {
        serde_json::to_string(&self.details).unwrap_or_else(|_| "[]".to_string())
    }
}

impl From<RpcStatus> for StoreError {
    fn from(status: RpcStatus) -> Self {
        Self::General(format!("secure storage call failed with {}", status.code))
    }
}

// ============================================================================
// SECTION: Duration Mapping
// ============================================================================

/// Renders a duration as decimal seconds with an `s` suffix.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else {
        let fraction = format!("{nanos:09}");
        format!("{}.{}s", duration.as_secs(), fraction.trim_end_matches('0'))
    }
}

/// Parses decimal seconds with an `s` suffix. Negative durations are
/// rejected.
#[must_use]
pub fn parse_duration(text: &str) -> Option<Duration> {
    let digits = text.strip_suffix('s')?;
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 9 || !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let seconds: u64 = whole.parse().ok()?;
    let nanos: u32 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().ok()?
    };
    Some(Duration::new(seconds, nanos))
}

/// Serde adapter for optional durations.
mod proto_duration {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as _;

    /// Serializes a present duration; absent values are skipped upstream.
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_str(&super::format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional duration string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        super::parse_duration(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid duration: {text}")))
    }
}

// ============================================================================
// SECTION: Timestamp Mapping
// ============================================================================

/// Serde adapter for optional RFC 3339 timestamps.
mod proto_timestamp {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    /// Serializes a present timestamp; absent values are skipped upstream.
    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(instant) => {
                let text = instant.format(&Rfc3339).map_err(S::Error::custom)?;
                serializer.serialize_str(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        OffsetDateTime::parse(&text, &Rfc3339).map(Some).map_err(D::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
