//! Adapter for stream-module bridges (`weex`).

use super::{Adapter, AdapterRequest, decode_body, to_header_map, with_timeout};
use crate::config::Headers;
use crate::response::{FailureKind, Response, TransportFailure};
use async_trait::async_trait;

/// Request passed to a [`StreamBridge`]. The body is always sent as text.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Fully built URL.
    pub url: String,
    /// Uppercase method name.
    pub method: String,
    /// Serialized body.
    pub body: Option<String>,
    /// Request headers.
    pub headers: Headers,
}

/// Callback payload of a stream `fetch`.
#[derive(Debug, Clone, Default)]
pub struct StreamResponse {
    /// HTTP status.
    pub status: u16,
    /// `true` for statuses in 200..=299.
    pub ok: bool,
    /// Status reason phrase.
    pub status_text: String,
    /// Raw body text.
    pub data: String,
    /// Response headers.
    pub headers: Headers,
}

/// Host-side binding to a stream module's `fetch`.
#[async_trait]
pub trait StreamBridge: Send + Sync {
    /// Fetch and resolve with the callback payload, or reject with a message.
    async fn fetch(&self, request: StreamRequest) -> std::result::Result<StreamResponse, String>;
}

/// Adapter over a [`StreamBridge`].
pub struct StreamAdapter<B> {
    bridge: B,
}

impl<B: StreamBridge> StreamAdapter<B> {
    /// Wrap a bridge.
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl<B: StreamBridge> Adapter for StreamAdapter<B> {
    async fn send(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        let response_type = request.response_type;
        let fetch = StreamRequest {
            url: request.url,
            method: request.method.as_str().to_string(),
            body: request.data.map(|data| match data {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            headers: request.headers,
        };

        with_timeout(request.timeout, async move {
            match self.bridge.fetch(fetch).await {
                Ok(res) if !res.ok => Err(TransportFailure::new(
                    FailureKind::Status(res.status),
                    if res.status_text.is_empty() {
                        format!("request failed with status {}", res.status)
                    } else {
                        res.status_text
                    },
                )
                .with_response_status(res.status.to_string())),
                Ok(res) => Ok(Response::new(res.status, decode_body(&res.data, response_type))
                    .with_response_text(res.data)
                    .with_headers(to_header_map(&res.headers))),
                Err(message) => Err(TransportFailure::new(FailureKind::Bridge, message)),
            }
        })
        .await
    }

    fn name(&self) -> &'static str {
        "stream"
    }
}
