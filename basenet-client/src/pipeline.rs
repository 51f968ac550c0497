//! Request pipeline: build, send, classify, report, retry.

use crate::adapter::{Adapter, AdapterRequest, RequestMethod};
use crate::biz::classify;
use crate::config::{BaseNetworkConfig, EffectiveConfig, RequestOptions};
use crate::report::{ErrorReporter, ReportContext, biz_error_payload, network_error_payload};
use crate::response::{HasError, Response, TransportFailure};
use crate::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::url::{ParsedUrl, url_parser};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// One logical request as handed to the pipeline.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Absolute URL, or a path appended to the base URL.
    pub url: String,
    pub method: RequestMethod,
    /// Query parameters; anything but an object is ignored.
    pub params: Value,
    /// Request body.
    pub data: Option<Value>,
    /// Per-call overrides.
    pub options: RequestOptions,
}

impl RequestConfig {
    /// Create a request with no params, body or overrides.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            params: Value::Null,
            data: None,
            options: RequestOptions::default(),
        }
    }

    /// Set query parameters.
    pub fn params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Set the request body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set per-call overrides.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Runs requests against one adapter with one instance config.
pub struct RequestPipeline {
    config: Arc<BaseNetworkConfig>,
    adapter: Arc<dyn Adapter>,
    reporter: ErrorReporter,
}

impl RequestPipeline {
    /// Create a pipeline. Reports share the adapter and use the instance
    /// headers and timeout.
    pub fn new(config: BaseNetworkConfig, adapter: Arc<dyn Adapter>) -> Self {
        let reporter =
            ErrorReporter::new(Arc::clone(&adapter), config.headers.clone(), config.timeout);

        Self {
            config: Arc::new(config),
            adapter,
            reporter,
        }
    }

    /// Get the instance configuration.
    pub fn config(&self) -> &BaseNetworkConfig {
        &self.config
    }

    /// Get the adapter.
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    /// Execute a request until it succeeds, hits a business error, or runs
    /// out of retries. Never fails: the outcome is on the returned envelope.
    pub async fn execute(&self, request: RequestConfig) -> Response {
        let RequestConfig {
            mut url,
            method,
            mut params,
            data,
            options,
        } = request;

        let effective = EffectiveConfig::merge(&self.config, &options);
        let mut retry = RetryState::new();
        let mut first: Option<ParsedUrl> = None;

        loop {
            let request_url = effective.request_url(&url, params.as_object());
            let parsed = url_parser(&request_url);
            let origin = first.get_or_insert_with(|| parsed.clone());

            debug!(
                method = %method,
                url = %request_url,
                adapter = self.adapter.name(),
                attempt = retry.attempt(),
                "Sending request"
            );

            let result = self
                .adapter
                .send(AdapterRequest {
                    url: request_url.clone(),
                    method,
                    data: data.clone(),
                    headers: effective.headers.clone(),
                    timeout: effective.timeout,
                    response_type: effective.response_type,
                })
                .await;

            let ctx = ReportContext {
                method,
                url: &request_url,
                parsed: &parsed,
                data: data.as_ref(),
            };

            match result {
                Ok(response) => return self.on_success(&effective, &ctx, response),
                Err(failure) => {
                    self.on_failure(&effective, &ctx, &failure);

                    match retry.on_failure(effective.retry_config.as_ref(), &request_url, origin) {
                        RetryDecision::Retry { url: next } => {
                            let max_retries = effective
                                .retry_config
                                .as_ref()
                                .and_then(|config| config.policy_for(origin.hostname()))
                                .map(RetryPolicy::max_retries);
                            debug!(
                                attempt = retry.attempt(),
                                max_retries = ?max_retries,
                                url = %next,
                                "Retrying request"
                            );
                            // The retry URL already carries the query.
                            url = next;
                            params = Value::Null;
                        }
                        RetryDecision::GiveUp => {
                            return Response::from_failure(failure, retry.attempt());
                        }
                    }
                }
            }
        }
    }

    fn on_success(
        &self,
        effective: &EffectiveConfig,
        ctx: &ReportContext<'_>,
        mut response: Response,
    ) -> Response {
        let biz = effective.resolve_biz(ctx.parsed.hostname());
        let has_error = classify(&response, biz.as_ref());
        response.set_has_error(has_error);

        if has_error == HasError::BizError
            && let Some(biz) = biz
        {
            warn!(
                url = %ctx.url,
                code = ?biz.code(&response),
                "Business error in response"
            );

            if let Some(report) = effective.resolve_report() {
                let payload = biz_error_payload(ctx, &response, &biz, &report.params);
                self.reporter.report(&report.url, payload);
            }
        }

        response
    }

    fn on_failure(
        &self,
        effective: &EffectiveConfig,
        ctx: &ReportContext<'_>,
        failure: &TransportFailure,
    ) {
        warn!(
            url = %ctx.url,
            error = %failure,
            status = failure.response_status().unwrap_or("-1"),
            "Request failed"
        );

        if let Some(report) = effective.resolve_report() {
            let payload = network_error_payload(ctx, failure, &report.params);
            self.reporter.report(&report.url, payload);
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("config", &self.config)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}
