use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::pipeline::BatchError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("No files provided")]
    NoFiles,
    #[error("payload exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::NoFiles => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Top-level `message` of the response body
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "Invalid request body",
            ApiError::NoFiles => "No files provided",
            ApiError::PayloadTooLarge(_) => "Payload Too Large",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.message().to_string(),
            error: match self {
                ApiError::NoFiles => None,
                other => Some(other.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<BatchError> for ApiError {
    fn from(value: BatchError) -> Self {
        match value {
            BatchError::NoFiles => ApiError::NoFiles,
            other => ApiError::Internal(other.to_string()),
        }
    }
}
