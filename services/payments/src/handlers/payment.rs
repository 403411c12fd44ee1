use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use soko_core::identity::MaybeUser;
use soko_domain::pagination::PageRequest;

use crate::domain::types::{PaymentSnapshot, PaymentStatus};
use crate::error::PaymentsServiceError;
use crate::state::AppState;
use crate::usecase::payment::{
    GetPaymentStatusUseCase, InitiatePaymentInput, InitiatePaymentUseCase,
    ListOrderPaymentsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InitiatePaymentResponse {
    pub payment_id: Uuid,
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub customer_message: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_total: Option<Decimal>,
    pub phone_number: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub mpesa_receipt_number: Option<String>,
    #[serde(serialize_with = "soko_core::serde::opt_to_rfc3339_ms")]
    pub transaction_date: Option<DateTime<Utc>>,
    pub result_code: Option<i32>,
    pub result_description: Option<String>,
    #[serde(serialize_with = "soko_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "soko_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentSnapshot> for PaymentResponse {
    fn from(snapshot: PaymentSnapshot) -> Self {
        let p = snapshot.payment;
        Self {
            id: p.id,
            order_id: p.order_id,
            order_total: snapshot.order_total,
            phone_number: p.phone_number,
            amount: p.amount,
            status: p.status,
            mpesa_receipt_number: p.receipt_number,
            transaction_date: p.transaction_date,
            result_code: p.result_code,
            result_description: p.result_description,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ── POST /payments/initiate ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InitiatePaymentRequest {
    pub order_id: Option<String>,
    pub phone_number: Option<String>,
}

pub async fn initiate_payment(
    MaybeUser(user_id): MaybeUser,
    State(state): State<AppState>,
    Json(body): Json<InitiatePaymentRequest>,
) -> Result<(StatusCode, Json<InitiatePaymentResponse>), PaymentsServiceError> {
    let usecase = InitiatePaymentUseCase {
        repo: state.payment_repo(),
        orders: state.order_port(),
        gateway: state.gateway(),
    };
    let initiated = usecase
        .execute(InitiatePaymentInput {
            order_id: body.order_id,
            phone_number: body.phone_number,
            user_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InitiatePaymentResponse {
            payment_id: initiated.payment_id,
            checkout_request_id: initiated.checkout_request_id,
            merchant_request_id: initiated.merchant_request_id,
            customer_message: initiated.customer_message,
        }),
    ))
}

// ── GET /payments/status/{id} ────────────────────────────────────────────────

pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, PaymentsServiceError> {
    let id: Uuid = id.parse().map_err(|_| PaymentsServiceError::PaymentNotFound)?;
    let usecase = GetPaymentStatusUseCase {
        repo: state.payment_repo(),
        orders: state.order_port(),
    };
    let snapshot = usecase.execute(id).await?;
    Ok(Json(snapshot.into()))
}

// ── GET /payments?order_id= ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PaymentListQuery {
    #[serde(rename = "order_id")]
    pub order_id: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<PaymentResponse>>, PaymentsServiceError> {
    let order_id = query
        .order_id
        .filter(|s| !s.trim().is_empty())
        .ok_or(PaymentsServiceError::MissingData)?;
    let order_id: Uuid = order_id
        .trim()
        .parse()
        .map_err(|_| PaymentsServiceError::OrderNotFound)?;

    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };

    let usecase = ListOrderPaymentsUseCase {
        repo: state.payment_repo(),
        orders: state.order_port(),
    };
    let snapshots = usecase.execute(order_id, page).await?;
    Ok(Json(snapshots.into_iter().map(Into::into).collect()))
}
