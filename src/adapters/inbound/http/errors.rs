// Maps application failures onto HTTP status codes with a `{ "message": .. }` body.

use crate::application::errors::ApplicationError;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<ApplicationError> for HttpError {
    fn from(error: ApplicationError) -> Self {
        let status = match &error {
            ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApplicationError::Conflict { .. } | ApplicationError::AlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            ApplicationError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApplicationError::InvalidPayload(_) | ApplicationError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApplicationError::Store(_) | ApplicationError::ReferenceData(_) => {
                tracing::error!(%error, "request failed on a backend error");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            }
        };
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
