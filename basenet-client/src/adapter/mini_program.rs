//! Adapter for mini-program style request APIs (`wx`, `uni`).

use super::{Adapter, AdapterRequest, to_header_map, with_timeout};
use crate::config::{Headers, ResponseType};
use crate::response::{FailureKind, Response, TransportFailure};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Request passed to a [`MiniProgramBridge`].
#[derive(Debug, Clone)]
pub struct MiniProgramRequest {
    /// Fully built URL.
    pub url: String,
    /// Uppercase method name.
    pub method: String,
    /// Request body.
    pub data: Option<Value>,
    /// Request headers.
    pub header: Headers,
    /// Timeout to hand to the runtime.
    pub timeout: Duration,
    /// Expected body format.
    pub response_type: ResponseType,
}

/// Payload of the runtime's `success` callback.
#[derive(Debug, Clone, Default)]
pub struct MiniProgramSuccess {
    /// HTTP status.
    pub status_code: u16,
    /// Body as decoded by the runtime.
    pub data: Value,
    /// Response headers.
    pub header: Headers,
    /// Cookies set by the response.
    pub cookies: Vec<String>,
}

/// Payload of the runtime's `fail` callback.
#[derive(Debug, Clone, Default)]
pub struct MiniProgramFail {
    /// Runtime error message.
    pub err_msg: String,
    /// Runtime error number, when given.
    pub errno: Option<i64>,
}

/// Host-side binding to a mini-program `request` API.
#[async_trait]
pub trait MiniProgramBridge: Send + Sync {
    /// Issue the request and resolve with whichever callback fired.
    async fn request(
        &self,
        request: MiniProgramRequest,
    ) -> std::result::Result<MiniProgramSuccess, MiniProgramFail>;
}

/// Adapter over a [`MiniProgramBridge`].
///
/// Only status 200 counts as success. `fail` callbacks map to a
/// `xcx-<errno>` status marker. The call races a local timer.
pub struct MiniProgramAdapter<B> {
    bridge: B,
}

impl<B: MiniProgramBridge> MiniProgramAdapter<B> {
    /// Wrap a bridge.
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    async fn call(&self, request: MiniProgramRequest) -> std::result::Result<Response, TransportFailure> {
        match self.bridge.request(request).await {
            Ok(res) if res.status_code != 200 => Err(TransportFailure::new(
                FailureKind::Status(res.status_code),
                format!("request failed with status {}", res.status_code),
            )
            .with_response_status(res.status_code.to_string())),
            Ok(res) => Ok(Response::new(res.status_code, res.data)
                .with_headers(to_header_map(&res.header))
                .with_cookies(res.cookies)),
            Err(fail) => {
                let errno = fail.errno.map(|n| n.to_string()).unwrap_or_default();
                Err(TransportFailure::new(FailureKind::Bridge, fail.err_msg)
                    .with_response_status(format!("xcx-{}", errno)))
            }
        }
    }
}

#[async_trait]
impl<B: MiniProgramBridge> Adapter for MiniProgramAdapter<B> {
    async fn send(&self, request: AdapterRequest) -> std::result::Result<Response, TransportFailure> {
        let timeout = request.timeout;
        let request = MiniProgramRequest {
            url: request.url,
            method: request.method.as_str().to_string(),
            data: request.data,
            header: request.headers,
            timeout,
            response_type: request.response_type,
        };

        with_timeout(timeout, self.call(request)).await
    }

    fn name(&self) -> &'static str {
        "mini-program"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RequestMethod;
    use serde_json::json;

    struct Fixed(std::result::Result<MiniProgramSuccess, MiniProgramFail>);

    #[async_trait]
    impl MiniProgramBridge for Fixed {
        async fn request(
            &self,
            request: MiniProgramRequest,
        ) -> std::result::Result<MiniProgramSuccess, MiniProgramFail> {
            assert_eq!(request.method, "POST");
            self.0.clone()
        }
    }

    struct Hanging;

    #[async_trait]
    impl MiniProgramBridge for Hanging {
        async fn request(
            &self,
            _request: MiniProgramRequest,
        ) -> std::result::Result<MiniProgramSuccess, MiniProgramFail> {
            futures::future::pending().await
        }
    }

    fn request() -> AdapterRequest {
        AdapterRequest {
            url: "https://a.com/x".to_string(),
            method: RequestMethod::Post,
            data: Some(json!({"a": 1})),
            headers: Headers::new(),
            timeout: Duration::from_millis(100),
            response_type: ResponseType::Json,
        }
    }

    #[tokio::test]
    async fn test_success_keeps_cookies() {
        let mut header = Headers::new();
        header.insert("content-type".to_string(), "application/json".to_string());
        let adapter = MiniProgramAdapter::new(Fixed(Ok(MiniProgramSuccess {
            status_code: 200,
            data: json!({"code": 0}),
            header,
            cookies: vec!["sid=1".to_string()],
        })));

        let response = adapter.send(request()).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.cookies(), Some(&["sid=1".to_string()][..]));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.response_text(), r#"{"code":0}"#);
    }

    #[tokio::test]
    async fn test_non_200_is_failure() {
        let adapter = MiniProgramAdapter::new(Fixed(Ok(MiniProgramSuccess {
            status_code: 404,
            ..Default::default()
        })));

        let failure = adapter.send(request()).await.unwrap_err();
        assert_eq!(failure.kind(), &FailureKind::Status(404));
        assert_eq!(failure.response_status(), Some("404"));
        assert_eq!(failure.response_text(), "");
    }

    #[tokio::test]
    async fn test_fail_callback_marker() {
        let adapter = MiniProgramAdapter::new(Fixed(Err(MiniProgramFail {
            err_msg: "request:fail".to_string(),
            errno: Some(600001),
        })));

        let failure = adapter.send(request()).await.unwrap_err();
        assert_eq!(failure.kind(), &FailureKind::Bridge);
        assert_eq!(failure.response_status(), Some("xcx-600001"));

        let adapter = MiniProgramAdapter::new(Fixed(Err(MiniProgramFail::default())));
        let failure = adapter.send(request()).await.unwrap_err();
        assert_eq!(failure.response_status(), Some("xcx-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_timeout() {
        let adapter = MiniProgramAdapter::new(Hanging);
        let failure = adapter.send(request()).await.unwrap_err();
        assert_eq!(failure.kind(), &FailureKind::Timeout);
    }
}
