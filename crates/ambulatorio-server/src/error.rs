//! HTTP error mapping.

use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use ambulatorio_core::{AmbulatorioError, AuthError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] AmbulatorioError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Core(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(AmbulatorioError::Unauthorized(msg)) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Core(AmbulatorioError::Forbidden(msg)) => (StatusCode::FORBIDDEN, msg),
            ApiError::Core(AmbulatorioError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(AmbulatorioError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Core(e) => {
                tracing::error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Multipart(e) => (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
