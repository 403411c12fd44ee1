use axum::extract::State;
use axum::http::StatusCode;

use soko_core::error::AppError;
use soko_core::health::readiness;

use crate::state::AppState;

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    readiness(state.db.ping().await)
}
