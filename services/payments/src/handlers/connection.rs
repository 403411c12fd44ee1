use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::PaymentsServiceError;
use crate::state::AppState;
use crate::usecase::connection::CheckGatewayConnectionUseCase;

#[derive(Serialize)]
pub struct ConnectionResponse {
    pub success: bool,
    pub message: &'static str,
}

// ── GET /payments/test-connection ────────────────────────────────────────────

pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<ConnectionResponse>, PaymentsServiceError> {
    let usecase = CheckGatewayConnectionUseCase {
        gateway: state.gateway(),
    };
    usecase.execute().await?;
    Ok(Json(ConnectionResponse {
        success: true,
        message: "M-Pesa connection successful",
    }))
}
