use http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::upstream::ErrorKind;
use shared_upstream::client::{GRADES_PATH, LOGIN_PATH};
use shared_upstream::{Candidate, ExtractionPlan, PayloadShape, UpstreamClient};
use shared_upstream::messages::GRADES;

fn client_for(server: &MockServer) -> UpstreamClient {
    UpstreamClient::new(&AppConfig {
        upstream_api_url: format!("{}/", server.uri()),
        ..AppConfig::default()
    })
}

#[tokio::test]
async fn test_get_relays_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GRADES_PATH))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200, "data": []})))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .get(GRADES_PATH, &Session::new("token-123"))
        .await
        .unwrap();

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"], json!([]));
}

#[tokio::test]
async fn test_non_json_body_becomes_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GRADES_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .get(GRADES_PATH, &Session::new("t"))
        .await
        .unwrap();

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.body, Value::Null);

    let plan = ExtractionPlan::new(GRADES, PayloadShape::Array, &[Candidate::Path("data")]);
    let err = shared_upstream::normalize_list::<Value>(&reply, &plan).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransportError);
}

#[tokio::test]
async fn test_post_json_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({"email": "a@b.mx", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .post_json(LOGIN_PATH, &json!({"email": "a@b.mx", "password": "secret"}))
        .await
        .unwrap();

    assert_eq!(reply.body["token"], "abc");
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let client = UpstreamClient::new(&AppConfig {
        upstream_api_url: "http://127.0.0.1:9".to_string(),
        ..AppConfig::default()
    });

    let err = client.get(GRADES_PATH, &Session::new("t")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransportError);
}
