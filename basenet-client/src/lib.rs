//! # basenet client
//!
//! A cross-platform HTTP request facade. One call surface sits over
//! interchangeable platform adapters and adds:
//!
//! - **URL building**: base URL joining and query merging
//! - **Business errors**: per-domain detection of error codes in successful payloads
//! - **Error reporting**: fire-and-forget diagnostics for every failed attempt
//! - **Retry**: per-hostname retry counts or origin rotation
//!
//! Calls never return `Err`. Each one settles with a [`Response`] whose
//! [`has_error`](Response::has_error) tells success, business error and
//! network error apart.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use basenet_client::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let network = BaseNetwork::new(
//!         BaseNetworkConfig::builder()
//!             .base_url("https://api.example.com")
//!             .biz(BizConfig::new("code", CodeNormal::one(0)).msg_key("msg"))
//!             .retry(RetryConfig::new().count("api.example.com", 2))
//!             .build(),
//!     )?;
//!
//!     let response = network
//!         .get("/users", json!({"page": 1}), RequestOptions::default())
//!         .await;
//!
//!     match response.has_error() {
//!         HasError::Success => println!("users: {}", response.data()),
//!         HasError::BizError => println!("rejected: {:?}", response.field("msg")),
//!         HasError::NetworkError => println!("gave up after {:?} retries", response.retry()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Mini-program runtimes
//!
//! `wx`, `uni` and `weex` have no built-in transport. Implement
//! [`MiniProgramBridge`] or [`StreamBridge`] against the host runtime and
//! pass the wrapped adapter to [`BaseNetwork::with_adapter`].

mod adapter;
mod biz;
mod client;
mod config;
mod error;
mod pipeline;
mod report;
mod response;
mod retry;
mod url;

pub use adapter::{
    Adapter, AdapterRequest, MiniProgramAdapter, MiniProgramBridge, MiniProgramFail,
    MiniProgramRequest, MiniProgramSuccess, ReqwestAdapter, RequestMethod, StreamAdapter,
    StreamBridge, StreamRequest, StreamResponse, create_adapter,
};
pub use biz::{BizConfig, CodeNormal, DomainBizConfig, ResolvedBizConfig, classify};
pub use client::BaseNetwork;
pub use config::{
    BaseNetworkConfig, BaseNetworkConfigBuilder, DEFAULT_TIMEOUT, EffectiveConfig, Headers,
    Platform, RequestOptions, ResponseType,
};
pub use error::{BaseNetworkError, Result};
pub use pipeline::{RequestConfig, RequestPipeline};
pub use report::{
    BIZ_ERROR_CODE, ErrorReportConfig, ErrorReporter, NETWORK_ERROR_CODE, ParamsProducer,
    ReportContext, ReportParams, ResolvedReportConfig, biz_error_payload, network_error_payload,
    report_time,
};
pub use response::{FailureKind, HasError, Response, TransportFailure};
pub use retry::{RetryConfig, RetryDecision, RetryPolicy, RetryState};
pub use url::{ParsedUrl, QueryParams, build_url_params, get_url_params, url_parser};

// Re-export common types
pub use http::{HeaderMap, HeaderValue, StatusCode, header};

/// Prelude for common imports.
///
/// ```
/// use basenet_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::{Adapter, MiniProgramAdapter, RequestMethod, StreamAdapter};
    pub use crate::biz::{BizConfig, CodeNormal, DomainBizConfig};
    pub use crate::client::BaseNetwork;
    pub use crate::config::{BaseNetworkConfig, Platform, RequestOptions, ResponseType};
    pub use crate::error::{BaseNetworkError, Result};
    pub use crate::pipeline::RequestConfig;
    pub use crate::report::ErrorReportConfig;
    pub use crate::response::{HasError, Response, TransportFailure};
    pub use crate::retry::RetryConfig;
    pub use http::HeaderMap;
}
