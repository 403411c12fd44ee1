use axum::http::StatusCode;

use crate::error::AppError;

/// Handler for `GET /healthz`: the process is up and serving.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Turn the outcome of a dependency check into a `GET /readyz` answer.
///
/// Services run their own check, such as a database ping, and hand the result here.
pub fn readiness<E>(check: Result<(), E>) -> Result<StatusCode, AppError>
where
    E: Into<anyhow::Error>,
{
    check
        .map(|()| StatusCode::OK)
        .map_err(|e| AppError::Unavailable(e.into()))
}
