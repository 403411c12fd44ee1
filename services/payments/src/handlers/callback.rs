use axum::{Json, extract::State};
use bytes::Bytes;
use serde::Serialize;

use crate::error::PaymentsServiceError;
use crate::state::AppState;
use crate::usecase::callback::ReconcileCallbackUseCase;

/// The acknowledgment body the provider expects. Anything other than a
/// `ResultCode` of 0 tells it to redeliver.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: &'static str,
}

impl CallbackAck {
    pub const ACCEPTED: Self = Self {
        result_code: 0,
        result_desc: "Success",
    };
    pub const REJECTED: Self = Self {
        result_code: 1,
        result_desc: "Failed",
    };
}

// ── POST /payments/callback ──────────────────────────────────────────────────

/// Always answers 200; the body carries the verdict. The raw body is taken so
/// a malformed payload still gets an acknowledgment instead of a rejection.
pub async fn mpesa_callback(State(state): State<AppState>, body: Bytes) -> Json<CallbackAck> {
    let usecase = ReconcileCallbackUseCase {
        repo: state.payment_repo(),
        retry: state.callback_lookup,
    };
    match usecase.execute(&body).await {
        Ok(_) => Json(CallbackAck::ACCEPTED),
        Err(e) => {
            match &e {
                PaymentsServiceError::Internal(err) => {
                    tracing::error!(error = %err, "callback reconciliation failed")
                }
                other => tracing::warn!(error = %other, kind = other.kind(), "callback rejected"),
            }
            Json(CallbackAck::REJECTED)
        }
    }
}
