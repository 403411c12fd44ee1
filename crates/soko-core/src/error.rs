use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Build the JSON error envelope every Soko service answers with:
/// `{"kind": "...", "message": "..."}`.
pub fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (status, axum::Json(body)).into_response()
}

/// Errors raised by the shared plumbing itself (routing fallback, readiness).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("route not found")]
    RouteNotFound,
    #[error("service unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RouteNotFound => "ROUTE_NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records method/uri/status; only the cause chain of
        // server-side failures is worth a log line here.
        match &self {
            Self::Unavailable(e) => tracing::warn!(error = %e, kind = "UNAVAILABLE", "not ready"),
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::RouteNotFound => {}
        }
        error_response(status, self.kind(), self.to_string())
    }
}

/// Router fallback: unknown paths get the JSON envelope instead of an empty 404.
pub async fn fallback() -> AppError {
    AppError::RouteNotFound
}
