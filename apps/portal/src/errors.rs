use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::notice::Notice;
use crate::resume::ResumeError;
use crate::wizard::submission::Incomplete;
use crate::wizard::validation::ValidationFailure;
use crate::wizard::WizardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every error body carries an error-level `notice` for the UI to toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationFailure> for AppError {
    fn from(e: ValidationFailure) -> Self {
        AppError::Validation(e.reason)
    }
}

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<Incomplete> for AppError {
    fn from(e: Incomplete) -> Self {
        AppError::Validation(format!(
            "{} (see \"{}\", step {})",
            e.failure.reason,
            e.step.title(),
            e.page + 1
        ))
    }
}

impl From<ResumeError> for AppError {
    fn from(e: ResumeError) -> Self {
        match e {
            ResumeError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            ResumeError::NotPdf(_) => AppError::UnsupportedMediaType(e.to_string()),
            ResumeError::Missing | ResumeError::Empty => AppError::Validation(e.to_string()),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Unauthorized => AppError::Unauthorized,
            BackendError::Forbidden => AppError::Forbidden,
            BackendError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Backend(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Please log in again".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::Backend(BackendError::Api { status, message }) if *status < 500 => {
                tracing::warn!("Backend rejected request ({status}): {message}");
                (StatusCode::BAD_REQUEST, "BACKEND_REJECTED", message.clone())
            }
            AppError::Backend(e) => {
                tracing::error!("Backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The service is unavailable right now. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            },
            "notice": Notice::error(message.clone()),
            "status": crate::notice::RequestStatus::Error,
        }));

        (status, body).into_response()
    }
}
