use crate::core::payload::DecodeError;
use crate::core::ports::{ReferenceDataError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("student {student_id} is already assigned to exam {session_id}")]
    Conflict {
        session_id: String,
        student_id: String,
    },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    ReferenceData(ReferenceDataError),
}

impl ApplicationError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate {
                session_id,
                student_id,
            } => Self::Conflict {
                session_id,
                student_id,
            },
            StoreError::Missing(id) => Self::not_found("assignment", id),
            other => Self::Store(other),
        }
    }
}

impl From<ReferenceDataError> for ApplicationError {
    fn from(error: ReferenceDataError) -> Self {
        match error {
            ReferenceDataError::Duplicate(what) => Self::AlreadyExists(what),
            other => Self::ReferenceData(other),
        }
    }
}

impl From<DecodeError> for ApplicationError {
    fn from(error: DecodeError) -> Self {
        Self::InvalidPayload(error.to_string())
    }
}
