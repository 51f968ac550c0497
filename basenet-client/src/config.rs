//! Instance and per-call configuration.

use crate::biz::{BizConfig, ResolvedBizConfig};
use crate::error::{BaseNetworkError, Result};
use crate::report::{ErrorReportConfig, ResolvedReportConfig};
use crate::retry::RetryConfig;
use crate::url::{QueryParams, build_url_params};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Request headers, by name.
pub type Headers = BTreeMap<String, String>;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Target runtime, selecting the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser-style HTTP client.
    #[default]
    Web,
    /// WeChat mini-program request API.
    Wx,
    /// Weex stream module.
    Weex,
    /// uni-app request API.
    Uni,
}

impl Platform {
    /// Get the platform name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Wx => "wx",
            Self::Weex => "weex",
            Self::Uni => "uni",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = BaseNetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "wx" => Ok(Self::Wx),
            "weex" => Ok(Self::Weex),
            "uni" => Ok(Self::Uni),
            other => Err(BaseNetworkError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Expected response body format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Decode the body as JSON, falling back to a string.
    #[default]
    Json,
    /// Keep the body as a string.
    Text,
}

fn timeout_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Instance configuration, fixed when a [`BaseNetwork`](crate::BaseNetwork) is created.
///
/// Deserializes from the camelCase option names (`baseURL`, `retryConfig`,
/// `bizConfig`, `errorReportConfig`); `timeout` is given in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseNetworkConfig {
    /// Target runtime.
    pub platform: Platform,
    /// Prefix for non-absolute request URLs.
    #[serde(rename = "baseURL")]
    pub base_url: String,
    /// Default request headers.
    pub headers: Headers,
    /// Default request timeout.
    #[serde(deserialize_with = "timeout_millis")]
    pub timeout: Duration,
    /// Expected response body format.
    pub response_type: ResponseType,
    /// Retry policies keyed by hostname.
    pub retry_config: Option<RetryConfig>,
    /// Business error-code detection.
    pub biz_config: Option<BizConfig>,
    /// Diagnostic reporting target.
    pub error_report_config: Option<ErrorReportConfig>,
}

impl Default for BaseNetworkConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Web,
            base_url: String::new(),
            headers: Headers::new(),
            timeout: DEFAULT_TIMEOUT,
            response_type: ResponseType::Json,
            retry_config: None,
            biz_config: None,
            error_report_config: None,
        }
    }
}

impl BaseNetworkConfig {
    /// Create a new configuration builder.
    pub fn builder() -> BaseNetworkConfigBuilder {
        BaseNetworkConfigBuilder::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        self
    }
}

/// Builder for [`BaseNetworkConfig`].
#[derive(Debug, Default)]
pub struct BaseNetworkConfigBuilder {
    config: BaseNetworkConfig,
}

impl BaseNetworkConfigBuilder {
    /// Set the target platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    /// Set the base URL for relative request URLs.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Set the default request timeout. Zero falls back to the default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the expected response body format.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.config.response_type = response_type;
        self
    }

    /// Set retry policies.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.config.retry_config = Some(config);
        self
    }

    /// Set business error-code detection.
    pub fn biz(mut self, config: BizConfig) -> Self {
        self.config.biz_config = Some(config);
        self
    }

    /// Set the diagnostic reporting target.
    pub fn error_report(mut self, config: ErrorReportConfig) -> Self {
        self.config.error_report_config = Some(config);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BaseNetworkConfig {
        self.config.normalized()
    }
}

/// Per-call overrides. Every field that is set replaces the instance value.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Prefix for non-absolute URLs.
    pub base_url: Option<String>,
    /// Headers; replace the instance headers as a whole.
    pub headers: Option<Headers>,
    /// Request timeout. Zero keeps the instance timeout.
    pub timeout: Option<Duration>,
    /// Expected response body format.
    pub response_type: Option<ResponseType>,
    /// Retry policies keyed by hostname.
    pub retry_config: Option<RetryConfig>,
    /// Business error-code detection.
    pub biz_config: Option<BizConfig>,
    /// Diagnostic reporting target.
    pub error_report_config: Option<ErrorReportConfig>,
}

impl RequestOptions {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the instance headers for this call.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Override the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the response body format.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Override retry policies.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Override business error-code detection.
    pub fn biz(mut self, config: BizConfig) -> Self {
        self.biz_config = Some(config);
        self
    }

    /// Override the reporting target.
    pub fn error_report(mut self, config: ErrorReportConfig) -> Self {
        self.error_report_config = Some(config);
        self
    }
}

/// Instance configuration with per-call overrides applied.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Target runtime, always from the instance.
    pub platform: Platform,
    /// Prefix for non-absolute URLs.
    pub base_url: String,
    /// Headers sent with the request.
    pub headers: Headers,
    /// Request timeout.
    pub timeout: Duration,
    /// Expected response body format.
    pub response_type: ResponseType,
    /// Retry policies keyed by hostname.
    pub retry_config: Option<RetryConfig>,
    /// Business error-code detection.
    pub biz_config: Option<BizConfig>,
    /// Diagnostic reporting target.
    pub error_report_config: Option<ErrorReportConfig>,
}

impl EffectiveConfig {
    /// Shallow field-by-field merge; set call fields win.
    pub fn merge(instance: &BaseNetworkConfig, call: &RequestOptions) -> Self {
        fn pick<T: Clone>(call: &Option<T>, instance: &T) -> T {
            call.as_ref().unwrap_or(instance).clone()
        }

        Self {
            platform: instance.platform,
            base_url: pick(&call.base_url, &instance.base_url),
            headers: pick(&call.headers, &instance.headers),
            timeout: call
                .timeout
                .filter(|t| !t.is_zero())
                .unwrap_or(instance.timeout),
            response_type: pick(&call.response_type, &instance.response_type),
            retry_config: call.retry_config.clone().or_else(|| instance.retry_config.clone()),
            biz_config: call.biz_config.clone().or_else(|| instance.biz_config.clone()),
            error_report_config: call
                .error_report_config
                .clone()
                .or_else(|| instance.error_report_config.clone()),
        }
    }

    /// Build the full request URL.
    ///
    /// URLs starting with `http` are used as-is; anything else is prefixed
    /// with the base URL.
    pub fn request_url(&self, url: &str, params: Option<&QueryParams>) -> String {
        if url.starts_with("http") {
            build_url_params(url, params)
        } else {
            build_url_params(&format!("{}{}", self.base_url, url), params)
        }
    }

    /// Resolve business error-code detection for `hostname`.
    pub fn resolve_biz(&self, hostname: Option<&str>) -> Option<ResolvedBizConfig> {
        self.biz_config.as_ref()?.resolve(hostname)
    }

    /// Resolve the reporting target, invoking any params producer.
    pub fn resolve_report(&self) -> Option<ResolvedReportConfig> {
        self.error_report_config.as_ref()?.resolve()
    }
}
