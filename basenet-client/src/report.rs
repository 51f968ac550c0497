//! Fire-and-forget error reporting.
//!
//! Each failed attempt, business or network, produces one diagnostic POST to
//! the configured report URL. Reports go through the same adapter as regular
//! requests but skip classification, retry, and reporting of their own. Their
//! failures are logged and dropped.

use crate::adapter::{Adapter, AdapterRequest, RequestMethod};
use crate::biz::ResolvedBizConfig;
use crate::config::{Headers, ResponseType};
use crate::response::{Response, TransportFailure};
use crate::url::{ParsedUrl, QueryParams};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Error code reported for business errors.
pub const BIZ_ERROR_CODE: &str = "2050204";

/// Error code reported for network errors.
pub const NETWORK_ERROR_CODE: &str = "2050203";

/// Producer of extra report fields, invoked once per report.
pub type ParamsProducer = Arc<dyn Fn() -> Option<QueryParams> + Send + Sync>;

/// Extra fields merged into every report.
#[derive(Clone)]
pub enum ReportParams {
    /// Fixed fields.
    Static(QueryParams),
    /// Fields computed at report time.
    Producer(ParamsProducer),
}

impl ReportParams {
    /// Get the fields, invoking the producer if needed.
    pub fn produce(&self) -> QueryParams {
        match self {
            Self::Static(params) => params.clone(),
            Self::Producer(producer) => producer().unwrap_or_default(),
        }
    }
}

impl fmt::Debug for ReportParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(params) => f.debug_tuple("Static").field(params).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for ReportParams {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        QueryParams::deserialize(deserializer).map(Self::Static)
    }
}

/// Where and what to report.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReportConfig {
    /// Report endpoint.
    pub url: String,
    /// Extra fields; they override same-named built-in fields.
    #[serde(default)]
    pub params: Option<ReportParams>,
}

impl ErrorReportConfig {
    /// Report to `url` with no extra fields.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: None,
        }
    }

    /// Add fixed extra fields.
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(ReportParams::Static(params));
        self
    }

    /// Add extra fields computed at report time.
    pub fn params_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Option<QueryParams> + Send + Sync + 'static,
    {
        self.params = Some(ReportParams::Producer(Arc::new(producer)));
        self
    }

    /// Resolve the target. Returns `None` when no URL is set.
    pub fn resolve(&self) -> Option<ResolvedReportConfig> {
        if self.url.is_empty() {
            return None;
        }

        Some(ResolvedReportConfig {
            url: self.url.clone(),
            params: self
                .params
                .as_ref()
                .map(ReportParams::produce)
                .unwrap_or_default(),
        })
    }
}

/// Report target with extra fields already produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReportConfig {
    /// Report endpoint.
    pub url: String,
    /// Extra fields merged into the payload last.
    pub params: QueryParams,
}

/// `key=value` pairs joined by commas.
#[derive(Debug, Default)]
pub struct ErrorMessage {
    pairs: Vec<(&'static str, String)>,
}

impl ErrorMessage {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair.
    pub fn push(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// The request attempt being reported.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Method of the failed attempt.
    pub method: RequestMethod,
    /// Fully built URL of the attempt.
    pub url: &'a str,
    /// Parts of `url`.
    pub parsed: &'a ParsedUrl,
    /// Request body; only reported for POST.
    pub data: Option<&'a Value>,
}

impl ReportContext<'_> {
    fn message(&self) -> ErrorMessage {
        let request_data = match (self.method, self.data) {
            (RequestMethod::Post, Some(data)) => data.to_string(),
            _ => String::new(),
        };

        ErrorMessage::new()
            .push("request_method", self.method.as_str())
            .push("request_uri", self.url)
            .push("request_domain", self.parsed.hostname().unwrap_or_default())
            .push("request_path", self.parsed.pathname())
            .push("request_param", self.parsed.search())
            .push("request_data", request_data)
    }

    fn ext(&self, payload: &mut QueryParams, status: &str) {
        payload.insert("ext1".into(), self.parsed.pathname().into());
        payload.insert("ext2".into(), status.into());
        payload.insert(
            "ext3".into(),
            self.parsed.hostname().unwrap_or_default().into(),
        );
        payload.insert("ext4".into(), self.url.into());
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Current local time as `YYYYMMDDHHmmss`.
pub fn report_time() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

fn base_payload() -> QueryParams {
    let mut payload = QueryParams::new();
    payload.insert("time".into(), report_time().into());
    payload.insert("act".into(), "error".into());
    payload.insert("logtype".into(), "error".into());
    payload
}

/// Build the report for a business error.
pub fn biz_error_payload(
    ctx: &ReportContext<'_>,
    response: &Response,
    biz: &ResolvedBizConfig,
    extra: &QueryParams,
) -> QueryParams {
    let message = ctx
        .message()
        .push("response_status", "200")
        .push("response", response.response_text())
        .push("trace_id", text(biz.trace_id(response)))
        .push("reason", text(biz.reason(response)));

    let mut payload = base_payload();
    payload.insert("errorCode".into(), BIZ_ERROR_CODE.into());
    payload.insert("errorMess".into(), message.to_string().into());
    payload.insert(
        "serverCode".into(),
        biz.code(response).cloned().unwrap_or(Value::Null),
    );
    ctx.ext(&mut payload, "200");
    payload.extend(extra.clone());
    payload
}

/// Build the report for a network error.
pub fn network_error_payload(
    ctx: &ReportContext<'_>,
    failure: &TransportFailure,
    extra: &QueryParams,
) -> QueryParams {
    let status = failure.response_status().unwrap_or("-1");
    let message = ctx
        .message()
        .push("response_status", status)
        .push("response", failure.response_text())
        .push("trace_id", "")
        .push("reason", "");

    let mut payload = base_payload();
    payload.insert("errorCode".into(), NETWORK_ERROR_CODE.into());
    payload.insert("errorMess".into(), message.to_string().into());
    ctx.ext(&mut payload, status);
    payload.extend(extra.clone());
    payload
}

/// Sends reports on background tasks.
#[derive(Clone)]
pub struct ErrorReporter {
    adapter: Arc<dyn Adapter>,
    headers: Headers,
    timeout: Duration,
}

impl ErrorReporter {
    /// Create a reporter sending through `adapter` with the instance headers and timeout.
    pub fn new(adapter: Arc<dyn Adapter>, headers: Headers, timeout: Duration) -> Self {
        Self {
            adapter,
            headers,
            timeout,
        }
    }

    /// POST `payload` to `url` without waiting for the outcome.
    ///
    /// Must be called within a tokio runtime.
    pub fn report(&self, url: &str, payload: QueryParams) -> JoinHandle<()> {
        let adapter = Arc::clone(&self.adapter);
        let request = AdapterRequest {
            url: url.to_string(),
            method: RequestMethod::Post,
            data: Some(Value::Object(payload)),
            headers: self.headers.clone(),
            timeout: self.timeout,
            response_type: ResponseType::Json,
        };

        tokio::spawn(async move {
            let url = request.url.clone();
            if let Err(error) = adapter.send(request).await {
                debug!(url = %url, error = %error, "Error report failed");
            }
        })
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("adapter", &self.adapter.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
