use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use soko_payments::infra::mpesa::{MpesaClient, MpesaConfig};
use soko_payments::router::build_router;
use soko_payments::state::AppState;
use soko_payments::usecase::callback::LookupRetry;
use soko_testing::identity::MockIdentity;
use soko_testing::provider::MockProvider;

/// Router over a database that is never reachable; only routes that stop
/// before touching persistence are exercised here.
fn app(provider: &MockProvider) -> Router {
    let gateway = MpesaClient::new(MpesaConfig {
        base_url: provider.base_url().to_owned(),
        consumer_key: "consumer-key".to_owned(),
        consumer_secret: "consumer-secret".to_owned(),
        shortcode: "174379".to_owned(),
        passkey: "test-passkey".to_owned(),
        callback_url: "https://shop.example/payments/callback".to_owned(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    build_router(AppState {
        db: DatabaseConnection::Disconnected,
        gateway,
        callback_lookup: LookupRetry {
            retries: 0,
            backoff: Duration::ZERO,
        },
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<Value>) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn should_answer_healthz() {
    let provider = MockProvider::start().await;
    let (status, _) = send(app(&provider), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let provider = MockProvider::start().await;
    let (status, body) = send(app(&provider), get("/readyz")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.unwrap()["kind"], "UNAVAILABLE");
}

#[tokio::test]
async fn should_return_envelope_for_unknown_route() {
    let provider = MockProvider::start().await;
    let (status, body) = send(app(&provider), get("/payments/nope/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["kind"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn should_acknowledge_malformed_callback_with_failure() {
    let provider = MockProvider::start().await;
    let (status, body) = send(
        app(&provider),
        post_json("/payments/callback", "{\"Body\": 42"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "provider always gets a 200");
    assert_eq!(body.unwrap(), json!({ "ResultCode": 1, "ResultDesc": "Failed" }));
}

#[tokio::test]
async fn should_acknowledge_callback_without_content_type() {
    let provider = MockProvider::start().await;
    let request = Request::post("/payments/callback")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(app(&provider), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["ResultCode"], 1);
}

#[tokio::test]
async fn should_reject_initiation_without_required_fields() {
    let provider = MockProvider::start().await;
    let (status, body) = send(
        app(&provider),
        post_json("/payments/initiate", r#"{"phone_number": "0712345678"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = body.unwrap();
    assert_eq!(body["kind"], "MISSING_DATA");
    assert_eq!(body["message"], "order id and phone number are required");
    assert!(provider.stk_requests().is_empty());
}

#[tokio::test]
async fn should_reject_invalid_phone_before_any_lookup() {
    let provider = MockProvider::start().await;
    let mut request = post_json(
        "/payments/initiate",
        r#"{"order_id": "0195f2a4-5b6c-7d8e-9f00-112233445566", "phone_number": "12345"}"#,
    );
    request
        .headers_mut()
        .extend(MockIdentity::new(Uuid::now_v7()).headers());
    let (status, body) = send(app(&provider), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["kind"], "INVALID_PHONE_NUMBER");
}

#[tokio::test]
async fn should_return_not_found_for_malformed_payment_id() {
    let provider = MockProvider::start().await;
    let (status, body) = send(app(&provider), get("/payments/status/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["kind"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn should_require_order_id_to_list_payments() {
    let provider = MockProvider::start().await;
    let (status, body) = send(app(&provider), get("/payments?page=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["kind"], "MISSING_DATA");
}

#[tokio::test]
async fn should_check_provider_connection() {
    let provider = MockProvider::start().await;
    let (status, body) = send(app(&provider), get("/payments/test-connection")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["success"], true);
    assert_eq!(provider.token_requests().len(), 1);
}

#[tokio::test]
async fn should_map_provider_auth_failure_to_bad_gateway() {
    let provider = MockProvider::start().await;
    provider.set_token_reply(401, json!({}));
    let (status, body) = send(app(&provider), get("/payments/test-connection")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body.unwrap()["kind"], "GATEWAY_AUTH");
}
