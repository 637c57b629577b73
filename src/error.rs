use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 画像認識が既に実行中
    #[error("Recognition already in progress")]
    Busy,

    #[error("Vision provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Busy => (
                StatusCode::TOO_MANY_REQUESTS,
                "A recognition request is already in progress".to_string(),
            ),
            AppError::Provider(msg) => {
                error!("vision provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
