use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome classes of an upstream call, as surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    AuthExpired,
    Forbidden,
    NotFound,
    UpstreamError,
    NoPayload,
    /// Warning-level: data was returned without passing validation.
    ValidationFallback,
    TransportError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthExpired => "AUTH_EXPIRED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::NoPayload => "NO_PAYLOAD",
            ErrorKind::ValidationFallback => "VALIDATION_FALLBACK",
            ErrorKind::TransportError => "TRANSPORT_ERROR",
        }
    }

    /// Bucket a non-success envelope status code. Codes outside the known
    /// buckets have no kind of their own and are reported as upstream errors
    /// carrying the upstream's message.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => ErrorKind::AuthExpired,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            _ => ErrorKind::UpstreamError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
