//! crates/podscript_core/src/ports.rs
//!
//! Defines the contracts (traits) the data-access layer is built on.
//! These traits form the boundary of the hexagonal architecture: the
//! repositories only ever talk to a `Transport` and a `SessionStore`, so the
//! HTTP client and the credential storage can be swapped out in tests.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::Credential;

//=========================================================================================
// Surfaced Error Kind
//=========================================================================================

/// The error kinds the data-access layer surfaces to its consumers.
///
/// Raw transport failures never escape a repository; they are classified
/// into one of these first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Invalid or expired token. Please log in again.")]
    Unauthenticated,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Network error. Please check your connection.")]
    NetworkUnavailable,
    #[error("{0}")]
    ServerRejected(String),
    #[error("Invalid value for {0}")]
    ValidationFailed(String),
    #[error("Unexpected response from the server: {0}")]
    MalformedResponse(String),
    #[error("Could not read file: {0}")]
    LocalFile(String),
    /// The caller gave up on the operation. Never stored in repository state.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Whether the consumer should send the user back to the login surface.
    pub fn requires_login(&self) -> bool {
        matches!(self, ErrorKind::Unauthenticated)
    }
}

//=========================================================================================
// Session Store Port
//=========================================================================================

/// Failure to reach the local credential storage.
#[derive(Debug, thiserror::Error)]
#[error("Session storage unavailable: {0}")]
pub struct StorageError(pub String);

/// Holds the single active credential.
///
/// Only `set` and `clear` can fail, and only because storage is unavailable;
/// `get` folds such failures into `None`, which callers treat as logged out.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    /// Stores the credential. `persistent` keeps it across restarts until it
    /// expires, otherwise it lives only as long as this process.
    fn set(&self, credential: Credential, persistent: bool) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

//=========================================================================================
// Transport Port
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Which timeout budget a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestClass {
    #[default]
    Standard,
    Upload,
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// A single file part named `file`.
    Multipart {
        file_name: String,
        mime: String,
        data: Bytes,
    },
}

/// One call against the REST API, relative to the transport's base address.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub bearer: Option<Credential>,
    pub class: RequestClass,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
            class: RequestClass::Standard,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Appends a query parameter; empty values are skipped.
    pub fn query(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn bearer(mut self, credential: Credential) -> Self {
        self.bearer = Some(credential);
        self
    }

    pub fn upload(mut self) -> Self {
        self.class = RequestClass::Upload;
        self
    }
}

/// The `{success, data, message, total}` wrapper every API response uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Envelope {
    /// A missing `success` flag counts as failure.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// A response that made it back from the server, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` when a non-2xx body was not an envelope.
    pub envelope: Option<Envelope>,
}

impl ApiResponse {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP response level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("No response received: {0}")]
    Unreachable(String),
    #[error("Could not decode response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request exactly once; there are no retries.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
