//! Unified error handling for the backend API.
//!
//! Every failure is logged here and rendered as the `{success: false,
//! message}` envelope the scheduler widget understands, with a status code
//! matching the kind of failure.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::api::ErrorResponse;
use thiserror::Error;

use crate::monday::MondayError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// monday.com call failed or returned errors
    #[error(transparent)]
    Monday(#[from] MondayError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body failed validation
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request body was not acceptable JSON
    #[error("Invalid JSON: {0}")]
    JsonBody(#[from] JsonRejection),

    /// Path parameter could not be extracted
    #[error("Invalid path: {0}")]
    PathParam(#[from] PathRejection),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Monday(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_)
            | ApiError::Validation(_)
            | ApiError::JsonBody(_)
            | ApiError::PathParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
