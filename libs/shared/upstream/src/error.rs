use thiserror::Error;

use shared_models::error::AppError;
use shared_models::upstream::ErrorKind;

/// A failed upstream call: the error kind plus the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct UpstreamError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UpstreamError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, message)
    }

    pub fn no_payload(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoPayload, message)
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::upstream(err.kind, err.message)
    }
}
