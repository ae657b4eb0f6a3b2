//! HTTP error responses.
//!
//! Every failure is answered with a JSON body `{ "code", "error" }`. Problems
//! with the request itself map to 400; anything else maps to 500 and carries
//! the failed action as a prefix, e.g. `"Prediction failed: ..."`.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use credit_inference::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure while serving a prediction.
    #[error("{0}")]
    Predict(#[from] InferenceError),

    /// Failure while refitting the cached pipeline state.
    #[error("{0}")]
    Refit(InferenceError),

    /// The body could not be read as multipart form data.
    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    /// The blocking worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Predict(e) | Self::Refit(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Predict(e) | Self::Refit(e) => e.error_code(),
            Self::Multipart(_) => "INVALID_MULTIPART",
            Self::Task(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        if self.status().is_client_error() {
            return self.to_string();
        }
        match self {
            Self::Refit(e) => format!("Refit failed: {}", e),
            other => format!("Prediction failed: {}", other),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Predict(InferenceError::NoInput(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.error_code(),
            error: self.message(),
        };
        if status.is_server_error() {
            error!("{} ({})", body.error, body.code);
        } else {
            warn!("Rejected request: {} ({})", body.error, body.code);
        }
        (status, Json(body)).into_response()
    }
}
