//! Browser-style adapter backed by `reqwest`.

use super::{Adapter, AdapterRequest, decode_body, with_timeout};
use crate::error::Result;
use crate::response::{FailureKind, Response, TransportFailure};
use crate::url::{QueryParams, build_url_params};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const JSONP_FAILURE_STATUS: &str = "jsonp-unknow";

/// HTTP adapter for the `web` platform.
///
/// Non-2xx statuses are failures carrying the status and body. `JSONP`
/// requests are sent as `GET` with a generated `callback` parameter and are
/// bounded by a local timer.
pub struct ReqwestAdapter {
    inner: reqwest::Client,
    jsonp_seq: AtomicU64,
}

impl ReqwestAdapter {
    /// Create an adapter with a default client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("basenet/{}", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self::from_client(client))
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            jsonp_seq: AtomicU64::new(0),
        }
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    async fn request(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        let Some(method) = request.method.to_http() else {
            return self.jsonp(request).await;
        };

        let mut builder = self
            .inner
            .request(method, &request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(data) = &request.data {
            builder = builder.json(data);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body: Bytes = response.bytes().await?;
        let text = String::from_utf8_lossy(&body).into_owned();

        debug!(status = %status, url = %request.url, "Received HTTP response");

        if !status.is_success() {
            return Err(TransportFailure::status(status.as_u16(), text));
        }

        Ok(Response::new(status.as_u16(), decode_body(&text, request.response_type))
            .with_response_text(text)
            .with_headers(headers))
    }

    async fn jsonp(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        let callback = format!(
            "basenet_jsonp_{}",
            self.jsonp_seq.fetch_add(1, Ordering::Relaxed)
        );

        let mut params = QueryParams::new();
        params.insert("callback".into(), Value::String(callback.clone()));
        let url = build_url_params(&request.url, Some(&params));

        with_timeout(request.timeout, self.jsonp_call(&url, &callback)).await
    }

    async fn jsonp_call(&self, url: &str, callback: &str) -> std::result::Result<Response, TransportFailure> {
        let response = self.inner.get(url).send().await.map_err(jsonp_failure)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::new(
                FailureKind::Status(status.as_u16()),
                format!("JSONP request failed with status {}", status.as_u16()),
            )
            .with_response_status(JSONP_FAILURE_STATUS));
        }

        let text = response.text().await.map_err(jsonp_failure)?;
        let data = unwrap_jsonp(&text, callback).ok_or_else(|| {
            TransportFailure::new(FailureKind::Decode, "invalid JSONP payload")
                .with_response_status(JSONP_FAILURE_STATUS)
        })?;

        Ok(Response::new(status.as_u16(), data))
    }
}

#[async_trait]
impl Adapter for ReqwestAdapter {
    async fn send(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        self.request(request).await
    }

    fn name(&self) -> &'static str {
        "web"
    }
}

fn jsonp_failure(e: reqwest::Error) -> TransportFailure {
    TransportFailure::from(e).with_response_status(JSONP_FAILURE_STATUS)
}

/// Extract the JSON argument of `callback(...)`.
fn unwrap_jsonp(text: &str, callback: &str) -> Option<Value> {
    let text = text.trim().trim_start_matches("/**/").trim_start();
    let inner = text
        .strip_prefix(callback)?
        .trim_start()
        .strip_prefix('(')?;
    let inner = inner.trim_end().trim_end_matches(';').trim_end().strip_suffix(')')?;
    serde_json::from_str(inner).ok()
}
