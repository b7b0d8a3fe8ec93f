use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::{MockUpstreamResponses, TestConfig, TokenTestUtils};
use student_cell::router::student_routes;

fn app(server: &MockServer) -> Router {
    student_routes(TestConfig::with_mock_server(&server.uri()).to_arc())
}

async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header("cookie", format!("auth_token={}", token));
    }

    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn mount(server: &MockServer, route: &str, token: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api{}", route)))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_requires_session() {
    let server = MockServer::start().await;

    let (status, body) = get(app(&server), "/grades", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("No hay sesión activa"));

    let expired = TokenTestUtils::create_expired_token();
    let (status, _) = get(app(&server), "/grades", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante",
        &token,
        MockUpstreamResponses::envelope(MockUpstreamResponses::student_info("20030001")),
    )
    .await;

    let (status, body) = get(app(&server), "/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validated"], true);
    assert_eq!(body["data"]["numero_control"], "20030001");
    assert_eq!(body["data"]["promedio_ponderado"], "89.46");
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn test_profile_raw_fallback_is_flagged() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante",
        &token,
        MockUpstreamResponses::envelope(json!({ "persona": "ANA", "semestre": 3 })),
    )
    .await;

    let (status, body) = get(app(&server), "/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validated"], false);
    assert_eq!(body["warning"], "VALIDATION_FALLBACK");
    assert_eq!(body["data"]["persona"], "ANA");
}

#[tokio::test]
async fn test_grades() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/calificaciones",
        &token,
        MockUpstreamResponses::envelope(json!([MockUpstreamResponses::grades_period()])),
    )
    .await;

    let (status, body) = get(app(&server), "/grades", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validated"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["promedio"], "85.00");
}

#[tokio::test]
async fn test_envelope_status_wins_over_http_status() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/calificaciones",
        &token,
        MockUpstreamResponses::error_envelope(401, "Unauthorized"),
    )
    .await;

    let (status, body) = get(app(&server), "/grades", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "AUTH_EXPIRED");
    assert_eq!(
        body["error"],
        "Tu sesión ha expirado. Por favor, inicia sesión nuevamente."
    );
}

#[tokio::test]
async fn test_grades_without_array_is_no_payload() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/calificaciones",
        &token,
        json!({ "status": 200, "data": { "unexpected": true } }),
    )
    .await;

    let (status, body) = get(app(&server), "/grades", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "NO_PAYLOAD");
    assert_eq!(body["error"], "No se recibieron calificaciones válidas");
}

#[tokio::test]
async fn test_kardex_with_filters() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/kardex",
        &token,
        MockUpstreamResponses::envelope(MockUpstreamResponses::kardex()),
    )
    .await;

    let (status, body) = get(app(&server), "/kardex?semestre=2", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validated"], true);
    assert_eq!(body["data"]["subjects"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["summary"]["materias_reprobadas"], 1);
    assert_eq!(body["data"]["porcentaje_avance"], 58.5);
}

#[tokio::test]
async fn test_kardex_fallback_without_rows_fails() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/kardex",
        &token,
        MockUpstreamResponses::envelope(json!({ "porcentaje_avance": 10 })),
    )
    .await;

    let (status, body) = get(app(&server), "/kardex", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Formato de respuesta inválido");
}

#[tokio::test]
async fn test_schedule() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/horarios",
        &token,
        MockUpstreamResponses::envelope(MockUpstreamResponses::schedule()),
    )
    .await;

    let (status, body) = get(app(&server), "/schedule", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["metadata"]["total_materias"], 2);
    assert_eq!(body["metadata"]["periodo"]["clave_periodo"], "20251");
    assert_eq!(body["metadata"]["sesiones_por_dia"]["LUNES"], 2);
}

#[tokio::test]
async fn test_empty_schedule() {
    let server = MockServer::start().await;
    let token = TokenTestUtils::create_test_token(1);
    mount(
        &server,
        "/movil/estudiante/horarios",
        &token,
        MockUpstreamResponses::envelope(json!([])),
    )
    .await;

    let (status, body) = get(app(&server), "/schedule", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["metadata"]["total_materias"], 0);
}
