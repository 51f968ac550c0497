//! Response envelope and transport failures.

use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Outcome classification attached to every [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum HasError {
    /// Transport and business checks passed.
    Success,
    /// Transport succeeded but the payload carries a business error code.
    BizError,
    /// The adapter failed and retries, if any, were exhausted.
    NetworkError,
}

impl HasError {
    /// Numeric code: `0`, `1` or `-1`.
    pub fn code(&self) -> i8 {
        match self {
            Self::Success => 0,
            Self::BizError => 1,
            Self::NetworkError => -1,
        }
    }
}

impl From<HasError> for i8 {
    fn from(value: HasError) -> Self {
        value.code()
    }
}

impl TryFrom<i8> for HasError {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::BizError),
            -1 => Ok(Self::NetworkError),
            other => Err(format!("invalid hasError code: {}", other)),
        }
    }
}

/// Why an adapter call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// A local or transport timeout fired.
    Timeout,
    /// Connection could not be established.
    Connect,
    /// The server answered with a non-success status.
    Status(u16),
    /// A platform bridge reported a failure.
    Bridge,
    /// The response body could not be decoded.
    Decode,
    /// Anything else.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connection error"),
            Self::Status(status) => write!(f, "status {}", status),
            Self::Bridge => write!(f, "bridge error"),
            Self::Decode => write!(f, "decode error"),
            Self::Other => write!(f, "transport error"),
        }
    }
}

/// Rejection produced by an [`Adapter`](crate::Adapter).
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportFailure {
    kind: FailureKind,
    message: String,
    response_text: String,
    response_status: Option<String>,
}

impl TransportFailure {
    /// Create a failure with no response text or status.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            response_text: String::new(),
            response_status: None,
        }
    }

    /// Local timer expired before the call settled.
    pub fn timeout() -> Self {
        Self::new(FailureKind::Timeout, "Timeout").with_response_status("timeout-unknow")
    }

    /// Non-success HTTP status.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::new(FailureKind::Status(status), format!("request failed with status {}", status))
            .with_response_text(body)
            .with_response_status(status.to_string())
    }

    /// Attach the raw response text.
    pub fn with_response_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = text.into();
        self
    }

    /// Attach the platform's status marker.
    pub fn with_response_status(mut self, status: impl Into<String>) -> Self {
        self.response_status = Some(status.into());
        self
    }

    /// Get the failure kind.
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// Get the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the raw response text, if any was received.
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Get the platform status marker, if any.
    pub fn response_status(&self) -> Option<&str> {
        self.response_status.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            FailureKind::Timeout
        } else if e.is_connect() {
            FailureKind::Connect
        } else if e.is_decode() {
            FailureKind::Decode
        } else if let Some(status) = e.status() {
            FailureKind::Status(status.as_u16())
        } else {
            FailureKind::Other
        };

        let failure = Self::new(kind, e.to_string());
        match e.status() {
            Some(status) => failure.with_response_status(status.as_u16().to_string()),
            None => failure,
        }
    }
}

/// Classified response envelope.
///
/// Every call on [`BaseNetwork`](crate::BaseNetwork) settles with one of these;
/// inspect [`has_error`](Self::has_error) instead of matching on a `Result`.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    data: Value,
    response_text: String,
    headers: HeaderMap,
    cookies: Option<Vec<String>>,
    response_status: Option<String>,
    has_error: HasError,
    retry: Option<u32>,
    failure: Option<TransportFailure>,
}

impl Response {
    /// Create a successful transport response.
    ///
    /// The response text defaults to the JSON serialization of `data`.
    pub fn new(status: u16, data: Value) -> Self {
        let response_text = match &data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Self {
            status,
            data,
            response_text,
            headers: HeaderMap::new(),
            cookies: None,
            response_status: None,
            has_error: HasError::Success,
            retry: None,
            failure: None,
        }
    }

    /// Build the envelope for a request that failed after `retry` retries.
    pub fn from_failure(failure: TransportFailure, retry: u32) -> Self {
        Self {
            status: 0,
            data: Value::Null,
            response_text: failure.response_text().to_string(),
            headers: HeaderMap::new(),
            cookies: None,
            response_status: failure.response_status().map(str::to_string),
            has_error: HasError::NetworkError,
            retry: Some(retry),
            failure: Some(failure),
        }
    }

    /// Override the raw response text.
    pub fn with_response_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = text.into();
        self
    }

    /// Attach response headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach cookies returned by a mini-program runtime.
    pub fn with_cookies(mut self, cookies: Vec<String>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub(crate) fn set_has_error(&mut self, has_error: HasError) {
        self.has_error = has_error;
    }

    /// Get the HTTP status, `0` for network failures.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the decoded body.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Get a top-level field of the decoded body.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }

    /// Get the raw response text.
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get cookies, when the platform exposes them.
    pub fn cookies(&self) -> Option<&[String]> {
        self.cookies.as_deref()
    }

    /// Get the platform status marker of a network failure.
    pub fn response_status(&self) -> Option<&str> {
        self.response_status.as_deref()
    }

    /// Get the classification.
    pub fn has_error(&self) -> HasError {
        self.has_error
    }

    /// Number of retries made before giving up. Only set on network failures.
    pub fn retry(&self) -> Option<u32> {
        self.retry
    }

    /// Get the final transport failure. Only set on network failures.
    pub fn failure(&self) -> Option<&TransportFailure> {
        self.failure.as_ref()
    }

    /// Check if the call fully succeeded.
    pub fn is_success(&self) -> bool {
        self.has_error == HasError::Success
    }

    /// Check if the payload carried a business error.
    pub fn is_biz_error(&self) -> bool {
        self.has_error == HasError::BizError
    }

    /// Check if the transport failed.
    pub fn is_network_error(&self) -> bool {
        self.has_error == HasError::NetworkError
    }
}
