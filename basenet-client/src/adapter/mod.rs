//! Platform adapters.
//!
//! An [`Adapter`] turns one fully resolved request into a transport call. The
//! request pipeline never looks past this trait.

mod mini_program;
mod stream;
mod web;

pub use mini_program::{
    MiniProgramAdapter, MiniProgramBridge, MiniProgramFail, MiniProgramRequest,
    MiniProgramSuccess,
};
pub use stream::{StreamAdapter, StreamBridge, StreamRequest, StreamResponse};
pub use web::ReqwestAdapter;

use crate::config::{BaseNetworkConfig, Headers, Platform, ResponseType};
use crate::error::{BaseNetworkError, Result};
use crate::response::{Response, TransportFailure};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Request method, including JSONP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// `GET`.
    Get,
    /// `POST` with a JSON body.
    Post,
    /// `PUT` with a JSON body.
    Put,
    /// `DELETE`.
    Delete,
    /// `PATCH` with a JSON body.
    Patch,
    /// `HEAD`.
    Head,
    /// `OPTIONS`.
    Options,
    /// Script-tag style GET; web adapter only.
    Jsonp,
}

impl RequestMethod {
    /// Uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Jsonp => "JSONP",
        }
    }

    /// HTTP method, `None` for JSONP.
    pub fn to_http(&self) -> Option<http::Method> {
        match self {
            Self::Get => Some(http::Method::GET),
            Self::Post => Some(http::Method::POST),
            Self::Put => Some(http::Method::PUT),
            Self::Delete => Some(http::Method::DELETE),
            Self::Patch => Some(http::Method::PATCH),
            Self::Head => Some(http::Method::HEAD),
            Self::Options => Some(http::Method::OPTIONS),
            Self::Jsonp => None,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = BaseNetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "JSONP" => Ok(Self::Jsonp),
            _ => Err(BaseNetworkError::UnknownMethod(s.to_string())),
        }
    }
}

/// Fully resolved request handed to an adapter.
///
/// Query parameters are already part of `url`.
#[derive(Debug, Clone)]
pub struct AdapterRequest {
    /// Fully built URL, query included.
    pub url: String,
    /// Request method.
    pub method: RequestMethod,
    /// JSON body.
    pub data: Option<Value>,
    /// Request headers.
    pub headers: Headers,
    /// Time allowed for the whole call.
    pub timeout: Duration,
    /// How to decode the body.
    pub response_type: ResponseType,
}

/// Transport for one platform.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Send the request. Non-success statuses are failures.
    async fn send(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure>;

    /// Adapter name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

#[async_trait]
impl<A: Adapter + ?Sized> Adapter for Arc<A> {
    async fn send(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        (**self).send(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Create the built-in adapter for the configured platform.
///
/// Only [`Platform::Web`] has one; the mini-program and stream platforms need
/// an embedder-supplied bridge wrapped in [`MiniProgramAdapter`] or
/// [`StreamAdapter`].
pub fn create_adapter(config: &BaseNetworkConfig) -> Result<Arc<dyn Adapter>> {
    match config.platform {
        Platform::Web => Ok(Arc::new(ReqwestAdapter::new()?)),
        platform => Err(BaseNetworkError::BridgeRequired(platform)),
    }
}

/// Race `call` against a local timer.
///
/// The timer is dropped with the future on whichever side settles first.
pub(crate) async fn with_timeout<F>(
    timeout: Duration,
    call: F,
) -> std::result::Result<Response, TransportFailure>
where
    F: Future<Output = std::result::Result<Response, TransportFailure>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(TransportFailure::timeout()),
    }
}

/// Decode a body according to the expected format.
pub(crate) fn decode_body(text: &str, response_type: ResponseType) -> Value {
    match response_type {
        ResponseType::Json => serde_json::from_str(text)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        ResponseType::Text => Value::String(text.to_string()),
    }
}

/// Convert bridge headers, skipping names or values that are not valid HTTP.
pub(crate) fn to_header_map(headers: &Headers) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            map.insert(name, value);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FailureKind;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<RequestMethod>().unwrap(), RequestMethod::Get);
        assert_eq!("JSONP".parse::<RequestMethod>().unwrap(), RequestMethod::Jsonp);
        assert!("TRACE".parse::<RequestMethod>().is_err());
        assert_eq!(RequestMethod::Jsonp.to_http(), None);
        assert_eq!(RequestMethod::Patch.to_http(), Some(http::Method::PATCH));
    }

    #[test]
    fn test_factory_requires_bridge_for_mini_programs() {
        let config = BaseNetworkConfig::builder().platform(Platform::Wx).build();
        match create_adapter(&config) {
            Err(BaseNetworkError::BridgeRequired(Platform::Wx)) => {}
            other => panic!("unexpected: {:?}", other.map(|a| a.name())),
        }
    }

    #[test]
    fn test_factory_builds_web_adapter() {
        let adapter = create_adapter(&BaseNetworkConfig::default()).unwrap();
        assert_eq!(adapter.name(), "web");
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(r#"{"a":1}"#, ResponseType::Json), json!({"a": 1}));
        assert_eq!(decode_body("oops", ResponseType::Json), json!("oops"));
        assert_eq!(decode_body(r#"{"a":1}"#, ResponseType::Text), json!(r#"{"a":1}"#));
    }

    #[test]
    fn test_header_map_skips_invalid() {
        let mut headers = Headers::new();
        headers.insert("x-ok".to_string(), "1".to_string());
        headers.insert("bad header".to_string(), "2".to_string());
        let map = to_header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_timer_wins() {
        let result = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TransportFailure>(Response::new(200, Value::Null))
        })
        .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.kind(), &FailureKind::Timeout);
        assert_eq!(failure.response_status(), Some("timeout-unknow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_wins_over_timer() {
        let result = with_timeout(Duration::from_secs(5), async {
            Err::<Response, _>(TransportFailure::new(FailureKind::Bridge, "rejected"))
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), &FailureKind::Bridge);
    }
}
