// crates/persistent-store-remote/src/http.rs
// ============================================================================
// Module: HTTP Secure Storage Client
// Description: JSON-over-HTTP transport for the secure-storage service.
// Purpose: Carry secure-storage RPCs through a blocking HTTP client.
// Dependencies: reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! Each RPC is a `POST` of the JSON request to
//! `{endpoint}/{SERVICE_PATH}/{Method}`. Success responses carry the JSON
//! response message; failures carry a JSON [`RpcStatus`] or, when the body
//! is not a status, are mapped from the HTTP status code. Redirects are
//! never followed. The bearer token is attached only for non-local
//! endpoints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::SecureStorageClient;
use crate::config::RemoteStoreConfig;
use crate::config::RemoteStoreError;
use crate::wire::DeleteAllValuesRequest;
use crate::wire::DeleteValueRequest;
use crate::wire::GetValueRequest;
use crate::wire::GetValueResponse;
use crate::wire::RpcCode;
use crate::wire::RpcStatus;
use crate::wire::UpdateValueRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fully-qualified secure-storage service name.
pub const SERVICE_PATH: &str = "distp.gateway.secure_storage.v1.SecureStorageService";

/// JSON media type.
const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Client
// ============================================================================

/// Secure-storage client speaking JSON over HTTP.
pub struct HttpSecureStorageClient {
    /// Blocking HTTP client.
    client: Client,
    /// Service endpoint without trailing slash.
    endpoint: String,
    /// Bearer token attached to every call.
    token: Option<String>,
}

impl HttpSecureStorageClient {
    /// Builds a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteStoreError`] when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &RemoteStoreConfig) -> Result<Self, RemoteStoreError> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        let mut builder =
            Client::builder().user_agent(config.user_agent.clone()).redirect(Policy::none());
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|err| RemoteStoreError::Client(format!("http client build failed: {err}")))?;
        let token = if config.is_local() { None } else { config.token.clone() };
        Ok(Self {
            client,
            endpoint: trimmed_endpoint(&endpoint),
            token,
        })
    }

    /// Returns the URL an RPC method is posted to.
    #[must_use]
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{SERVICE_PATH}/{method}", self.endpoint)
    }

    /// Posts `request` to `method` and decodes the response message.
    fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, RpcStatus>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request).map_err(|err| {
            RpcStatus::new(RpcCode::Internal, format!("request encoding failed: {err}"))
        })?;
        let mut builder = self
            .client
            .post(self.method_url(method))
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .body(body);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().map_err(|err| transport_status(&err))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().map_err(|err| transport_status(&err))?;
        if !(200 ..= 299).contains(&status) {
            tracing::debug!(method, status, "secure storage call returned failure status");
            return Err(failure_status(status, &bytes));
        }
        let payload: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(payload).map_err(|err| {
            RpcStatus::new(RpcCode::Internal, format!("response decoding failed: {err}"))
        })
    }

    /// Posts `request` to a method whose response message is empty.
    fn call_empty<Req: Serialize>(&self, method: &str, request: &Req) -> Result<(), RpcStatus> {
        let _: Empty = self.call(method, request)?;
        Ok(())
    }
}

impl SecureStorageClient for HttpSecureStorageClient {
    fn get_value(&self, request: &GetValueRequest) -> Result<GetValueResponse, RpcStatus> {
        self.call("GetValue", request)
    }

    fn update_value(&self, request: &UpdateValueRequest) -> Result<(), RpcStatus> {
        self.call_empty("UpdateValue", request)
    }

    fn delete_value(&self, request: &DeleteValueRequest) -> Result<(), RpcStatus> {
        self.call_empty("DeleteValue", request)
    }

    fn delete_all_values(&self, request: &DeleteAllValuesRequest) -> Result<(), RpcStatus> {
        self.call_empty("DeleteAllValues", request)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Empty response message.
#[derive(Deserialize)]
struct Empty {}

/// Renders the endpoint without a trailing slash.
fn trimmed_endpoint(endpoint: &Url) -> String {
    endpoint.as_str().trim_end_matches('/').to_string()
}

/// Maps a transport failure onto an RPC status.
fn transport_status(err: &reqwest::Error) -> RpcStatus {
    let code = if err.is_timeout() {
        RpcCode::DeadlineExceeded
    } else if err.is_connect() {
        RpcCode::Unavailable
    } else {
        RpcCode::Unknown
    };
    RpcStatus::new(code, format!("http transport failed: {err}"))
}

/// Decodes a failure body, falling back to the HTTP status code.
fn failure_status(status: u16, body: &[u8]) -> RpcStatus {
    match serde_json::from_slice::<RpcStatus>(body) {
        Ok(decoded) => decoded,
        Err(_) => RpcStatus::new(RpcCode::from_http_status(status), format!("http status {status}")),
    }
}
