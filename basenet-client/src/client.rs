//! Request facade.

use serde_json::Value;
use std::sync::Arc;

use crate::{
    Adapter, BaseNetworkConfig, RequestConfig, RequestMethod, RequestOptions, RequestPipeline,
    Response, Result, create_adapter,
};

/// Cross-platform request facade.
///
/// Every call settles with a classified [`Response`]; check
/// [`Response::has_error`] for business and network failures.
#[derive(Clone, Debug)]
pub struct BaseNetwork {
    pipeline: Arc<RequestPipeline>,
}

impl BaseNetwork {
    /// Create a facade using the built-in adapter for the configured platform.
    ///
    /// Fails for platforms that need a bridge; use [`with_adapter`](Self::with_adapter).
    pub fn new(config: BaseNetworkConfig) -> Result<Self> {
        let adapter = create_adapter(&config)?;
        Ok(Self::with_adapter(config, adapter))
    }

    /// Create a facade over any adapter.
    pub fn with_adapter(config: BaseNetworkConfig, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            pipeline: Arc::new(RequestPipeline::new(config, adapter)),
        }
    }

    /// Get the instance configuration.
    pub fn config(&self) -> &BaseNetworkConfig {
        self.pipeline.config()
    }

    /// Issue a GET request.
    pub async fn get(&self, url: impl Into<String>, params: Value, options: RequestOptions) -> Response {
        self.query(RequestMethod::Get, url.into(), params, options).await
    }

    /// Issue a DELETE request.
    pub async fn delete(&self, url: impl Into<String>, params: Value, options: RequestOptions) -> Response {
        self.query(RequestMethod::Delete, url.into(), params, options).await
    }

    /// Issue a HEAD request.
    pub async fn head(&self, url: impl Into<String>, params: Value, options: RequestOptions) -> Response {
        self.query(RequestMethod::Head, url.into(), params, options).await
    }

    /// Issue an OPTIONS request.
    pub async fn options(&self, url: impl Into<String>, params: Value, options: RequestOptions) -> Response {
        self.query(RequestMethod::Options, url.into(), params, options).await
    }

    /// Issue a POST request with a JSON body.
    pub async fn post(&self, url: impl Into<String>, data: Value, options: RequestOptions) -> Response {
        self.body(RequestMethod::Post, url.into(), data, options).await
    }

    /// Issue a PUT request with a JSON body.
    pub async fn put(&self, url: impl Into<String>, data: Value, options: RequestOptions) -> Response {
        self.body(RequestMethod::Put, url.into(), data, options).await
    }

    /// Issue a PATCH request with a JSON body.
    pub async fn patch(&self, url: impl Into<String>, data: Value, options: RequestOptions) -> Response {
        self.body(RequestMethod::Patch, url.into(), data, options).await
    }

    /// Issue a JSONP request. Only the web adapter supports it.
    pub async fn jsonp(&self, url: impl Into<String>, params: Value) -> Response {
        self.query(RequestMethod::Jsonp, url.into(), params, RequestOptions::default())
            .await
    }

    /// Execute a fully described request.
    pub async fn request(&self, request: RequestConfig) -> Response {
        self.pipeline.execute(request).await
    }

    async fn query(
        &self,
        method: RequestMethod,
        url: String,
        params: Value,
        options: RequestOptions,
    ) -> Response {
        self.request(
            RequestConfig::new(method, url)
                .params(or_empty(params))
                .options(options),
        )
        .await
    }

    async fn body(
        &self,
        method: RequestMethod,
        url: String,
        data: Value,
        options: RequestOptions,
    ) -> Response {
        self.request(
            RequestConfig::new(method, url)
                .data(or_empty(data))
                .options(options),
        )
        .await
    }
}

/// Omitted params and bodies become an empty object.
fn or_empty(value: Value) -> Value {
    if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    }
}
