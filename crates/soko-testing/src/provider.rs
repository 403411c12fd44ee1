//! In-process stand-in for the mobile-money provider's HTTP API.
//!
//! Binds `127.0.0.1:0`, serves the token and STK push endpoints with
//! configurable replies, and records what it received.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: String,
}

impl Reply {
    fn json(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response {
        (
            self.status,
            [("content-type", "application/json")],
            self.body,
        )
            .into_response()
    }
}

struct ProviderState {
    token_reply: Mutex<Reply>,
    stk_reply: Mutex<Reply>,
    stk_delay: Mutex<Option<Duration>>,
    token_auth: Mutex<Vec<String>>,
    stk_auth: Mutex<Vec<String>>,
    stk_bodies: Mutex<Vec<Value>>,
}

/// A running mock provider. The server lives until the test's runtime ends.
#[derive(Clone)]
pub struct MockProvider {
    base_url: String,
    state: Arc<ProviderState>,
}

pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";

impl MockProvider {
    /// Start with replies that accept every push.
    pub async fn start() -> Self {
        let state = Arc::new(ProviderState {
            token_reply: Mutex::new(Reply::json(
                200,
                &json!({ "access_token": MOCK_ACCESS_TOKEN, "expires_in": "3599" }),
            )),
            stk_reply: Mutex::new(Reply::json(
                200,
                &json!({
                    "MerchantRequestID": "mr_1",
                    "CheckoutRequestID": "ws_CO_1",
                    "ResponseCode": "0",
                    "ResponseDescription": "Success. Request accepted for processing",
                    "CustomerMessage": "Success. Request accepted for processing"
                }),
            )),
            stk_delay: Mutex::new(None),
            token_auth: Mutex::new(Vec::new()),
            stk_auth: Mutex::new(Vec::new()),
            stk_bodies: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/oauth/v1/generate", get(token))
            .route("/mpesa/stkpush/v1/processrequest", post(stk_push))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token_reply(&self, status: u16, body: Value) {
        *self.state.token_reply.lock().unwrap() = Reply::json(status, &body);
    }

    pub fn set_stk_reply(&self, status: u16, body: Value) {
        *self.state.stk_reply.lock().unwrap() = Reply::json(status, &body);
    }

    /// Reply with a body that is not JSON (e.g. an HTML error page).
    pub fn set_stk_raw_reply(&self, status: u16, body: &str) {
        *self.state.stk_reply.lock().unwrap() = Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_owned(),
        };
    }

    /// Hold every STK push reply for `delay`.
    pub fn set_stk_delay(&self, delay: Duration) {
        *self.state.stk_delay.lock().unwrap() = Some(delay);
    }

    /// `Authorization` headers seen by the token endpoint.
    pub fn token_requests(&self) -> Vec<String> {
        self.state.token_auth.lock().unwrap().clone()
    }

    /// `Authorization` headers seen by the STK push endpoint.
    pub fn stk_authorizations(&self) -> Vec<String> {
        self.state.stk_auth.lock().unwrap().clone()
    }

    /// JSON bodies posted to the STK push endpoint.
    pub fn stk_requests(&self) -> Vec<Value> {
        self.state.stk_bodies.lock().unwrap().clone()
    }
}

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn token(State(state): State<Arc<ProviderState>>, headers: HeaderMap) -> Response {
    state.token_auth.lock().unwrap().push(authorization(&headers));
    let reply = state.token_reply.lock().unwrap().clone();
    reply.into_response()
}

async fn stk_push(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.stk_auth.lock().unwrap().push(authorization(&headers));
    state.stk_bodies.lock().unwrap().push(body);
    let delay = *state.stk_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let reply = state.stk_reply.lock().unwrap().clone();
    reply.into_response()
}
