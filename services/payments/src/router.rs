use axum::{
    Router,
    routing::{get, post},
};

use soko_core::error::fallback;
use soko_core::health::healthz;
use soko_core::middleware::{request_id_layer, trace_layer};

use crate::handlers::{
    callback::mpesa_callback,
    connection::test_connection,
    health::readyz,
    payment::{get_payment_status, initiate_payment, list_payments},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Payments
        .route("/payments", get(list_payments))
        .route("/payments/initiate", post(initiate_payment))
        .route("/payments/status/{id}", get(get_payment_status))
        .route("/payments/test-connection", get(test_connection))
        // Provider webhook
        .route("/payments/callback", post(mpesa_callback))
        .fallback(fallback)
        // Outermost last: the request id must exist before the span reads it.
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
