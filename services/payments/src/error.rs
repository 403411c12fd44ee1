use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use soko_core::error::error_response;

/// Payments service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum PaymentsServiceError {
    #[error("order id and phone number are required")]
    MissingData,
    #[error("invalid phone number")]
    InvalidPhoneNumber,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("order not found")]
    OrderNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("order already paid")]
    OrderAlreadyPaid,
    #[error("payment provider authentication failed: {0}")]
    GatewayAuth(String),
    #[error("payment provider rejected the request: {0}")]
    GatewayRejected(String),
    #[error("payment provider unreachable: {0}")]
    GatewayUnavailable(String),
    #[error("payment provider timed out")]
    GatewayTimeout,
    #[error("malformed callback: {0}")]
    MalformedCallback(String),
    #[error("no payment matches callback")]
    UnmatchedCallback,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PaymentsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingData => "MISSING_DATA",
            Self::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::OrderAlreadyPaid => "ORDER_ALREADY_PAID",
            Self::GatewayAuth(_) => "GATEWAY_AUTH",
            Self::GatewayRejected(_) => "GATEWAY_REJECTED",
            Self::GatewayUnavailable(_) => "GATEWAY_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::MalformedCallback(_) => "MALFORMED_CALLBACK",
            Self::UnmatchedCallback => "UNMATCHED_CALLBACK",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for PaymentsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingData | Self::InvalidPhoneNumber | Self::InvalidAmount => {
                StatusCode::BAD_REQUEST
            }
            Self::OrderNotFound | Self::PaymentNotFound => StatusCode::NOT_FOUND,
            Self::OrderAlreadyPaid => StatusCode::CONFLICT,
            Self::GatewayAuth(_) | Self::GatewayRejected(_) | Self::GatewayUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            // The callback handler answers with the provider's acknowledgment
            // instead; these only reach here if a handler forgets to.
            Self::MalformedCallback(_) => StatusCode::BAD_REQUEST,
            Self::UnmatchedCallback => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Gateway failures are upstream trouble worth a line; other 4xx are
        // client mistakes that TraceLayer already records.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::GatewayAuth(_)
            | Self::GatewayRejected(_)
            | Self::GatewayUnavailable(_)
            | Self::GatewayTimeout => {
                tracing::warn!(error = %self, kind = self.kind(), "payment provider failure")
            }
            _ => {}
        }
        error_response(status, self.kind(), self.to_string())
    }
}
