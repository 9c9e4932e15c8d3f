use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced while handling a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),

    #[error("missing or mismatched CSRF token")]
    CsrfMismatch,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Template(e) => {
                tracing::error!(%e, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            AppError::CsrfMismatch => {
                tracing::warn!("rejected request with invalid CSRF token");
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
        }
    }
}
