use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Failures surfaced to HTTP clients. Bodies never carry internal detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    InternalServerError,
    RequestTimeout,
}

/// Uniform error body: `{"error": ..., "message": ..., "status": ...}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

impl AppError {
    pub fn status(self) -> StatusCode {
        match self {
            AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestTimeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn body(self) -> ErrorResponse {
        let (error, message) = match self {
            AppError::InternalServerError => {
                ("Internal server error", "An unexpected error occurred")
            }
            AppError::RequestTimeout => ("Service unavailable", "The request timed out"),
        };

        ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
            status: self.status().as_u16(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
