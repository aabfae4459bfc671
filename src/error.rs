use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures that are allowed to abort a request.
///
/// Reasoning-engine failures are deliberately absent: they are absorbed into
/// degraded results (see `ai::AiOutcome`) and never reach the caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("store unavailable: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Store(e) => {
                error!(error = %e, "store failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
