//! Web adapter tests against a local HTTP server.

use basenet_client::{
    Adapter, AdapterRequest, FailureKind, Headers, ReqwestAdapter, RequestMethod, ResponseType,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(method: RequestMethod, url: String) -> AdapterRequest {
    AdapterRequest {
        url,
        method,
        data: None,
        headers: Headers::new(),
        timeout: Duration::from_secs(5),
        response_type: ResponseType::Json,
    }
}

#[tokio::test]
async fn test_get_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "1"))
        .and(header("x-app", "shop"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 0, "users": []}))
                .insert_header("x-request-id", "r1"),
        )
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let mut req = request(RequestMethod::Get, format!("{}/users?page=1", server.uri()));
    req.headers.insert("x-app".to_string(), "shop".to_string());

    let response = adapter.send(req).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.field("code"), Some(&json!(0)));
    assert_eq!(response.header("x-request-id"), Some("r1"));
    assert_eq!(response.response_text(), r#"{"code":0,"users":[]}"#);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({"sku": 7})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let mut req = request(RequestMethod::Post, format!("{}/orders", server.uri()));
    req.data = Some(json!({"sku": 7}));

    let response = adapter.send(req).await.unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(response.field("id"), Some(&json!(1)));
}

#[tokio::test]
async fn test_text_response_type() {
    let server = MockServer::start().await;
    Mock::given(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#))
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let mut req = request(RequestMethod::Get, format!("{}/plain", server.uri()));
    req.response_type = ResponseType::Text;

    let response = adapter.send(req).await.unwrap();
    assert_eq!(response.data(), &json!(r#"{"a":1}"#));
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let failure = adapter
        .send(request(RequestMethod::Get, format!("{}/broken", server.uri())))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), &FailureKind::Status(503));
    assert_eq!(failure.response_status(), Some("503"));
    assert_eq!(failure.response_text(), "maintenance");
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let mut req = request(RequestMethod::Get, format!("{}/slow", server.uri()));
    req.timeout = Duration::from_millis(50);

    let failure = adapter.send(req).await.unwrap_err();
    assert_eq!(failure.kind(), &FailureKind::Timeout);
}

#[tokio::test]
async fn test_jsonp_unwraps_callback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("callback", "basenet_jsonp_0"))
        .and(query_param("tag", "a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"basenet_jsonp_0({"items":[1,2]});"#),
        )
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let response = adapter
        .send(request(RequestMethod::Jsonp, format!("{}/feed?tag=a", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.data(), &json!({"items": [1, 2]}));
}

#[tokio::test]
async fn test_jsonp_bad_payload() {
    let server = MockServer::start().await;
    Mock::given(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not a callback"))
        .mount(&server)
        .await;

    let adapter = ReqwestAdapter::new().unwrap();
    let failure = adapter
        .send(request(RequestMethod::Jsonp, format!("{}/feed", server.uri())))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), &FailureKind::Decode);
    assert_eq!(failure.response_status(), Some("jsonp-unknow"));
}
