use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // The client contract pins these exact body shapes.
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": "Method not allowed" })),
            )
                .into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "message": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

impl From<assembler::AssembleError> for AppError {
    fn from(err: assembler::AssembleError) -> Self {
        match err {
            assembler::AssembleError::InvalidInput(message) => AppError::BadRequest(message),
        }
    }
}

/// Convert common Axum rejections to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(_err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest("Question is required".to_string())
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
