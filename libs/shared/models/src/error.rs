use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::ErrorKind;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error ({kind}): {message}")]
    Upstream { kind: ErrorKind, message: String },
}

impl AppError {
    pub fn upstream(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError::Upstream {
            kind,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream { kind, .. } => match kind {
                ErrorKind::AuthExpired => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::ValidationError { message, fields } => json!({
                "error": message,
                "field_errors": fields,
            }),
            AppError::Upstream { kind, message } => json!({
                "error": message,
                "kind": kind,
            }),
            AppError::Auth(msg) => json!({
                "error": msg,
                "kind": ErrorKind::AuthExpired,
            }),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::Database(msg)
            | AppError::Conflict(msg) => json!({ "error": msg }),
        };

        tracing::error!("Error: {}: {}", status, self);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_kinds_map_to_http_status() {
        let cases = [
            (ErrorKind::AuthExpired, StatusCode::UNAUTHORIZED),
            (ErrorKind::Forbidden, StatusCode::FORBIDDEN),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::UpstreamError, StatusCode::BAD_GATEWAY),
            (ErrorKind::NoPayload, StatusCode::BAD_GATEWAY),
            (ErrorKind::TransportError, StatusCode::BAD_GATEWAY),
        ];

        for (kind, expected) in cases {
            assert_eq!(AppError::upstream(kind, "x").status_code(), expected);
        }
    }

    #[test]
    fn test_conflict_and_validation_status() {
        assert_eq!(AppError::Conflict("dup".into()).status_code(), StatusCode::CONFLICT);
        let invalid = AppError::ValidationError {
            message: "bad".into(),
            fields: BTreeMap::new(),
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }
}
