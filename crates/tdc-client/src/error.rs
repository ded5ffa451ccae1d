//! Error types for the TDC client.

use tdc_types::{ApiErrorBody, FieldErrors};
use thiserror::Error;

/// Errors that can occur when using the TDC client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Client configuration is unusable (bad base URL, etc).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP request failed before a response arrived.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an invalid or unparseable response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Form failed client-side or server-side validation.
    #[error("Validation failed: {}", summarize(.fields))]
    Validation {
        /// Messages per field.
        fields: FieldErrors,
    },

    /// 401 that is not a token-expiry signal (bad credentials, missing auth).
    #[error("Unauthorized: {}", .body.message())]
    Unauthorized {
        /// Parsed error body.
        body: ApiErrorBody,
    },

    /// Access token expired and could not be refreshed. The session has been cleared.
    #[error("Session expired: {}", .body.message())]
    SessionExpired {
        /// Body of the original 401.
        body: ApiErrorBody,
    },

    /// Signed-in user lacks the role for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other 4xx.
    #[error("Request rejected ({status}): {}", .body.message())]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Parsed error body.
        body: ApiErrorBody,
    },

    /// Server returned a 5xx error.
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// An optimistic cache edit was reverted because the request failed.
    #[error("Change reverted: {source}")]
    Rollback {
        /// The failure that caused the revert.
        #[source]
        source: Box<ClientError>,
    },
}

/// Coarse classification of failures, used to decide how the UI reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-level, shown inline, fix and resubmit.
    Validation,
    /// Token expired and refresh failed: go to login.
    AuthExpired,
    /// Bad credentials or wrong role.
    Authorization,
    /// Resource missing.
    NotFound,
    /// Request never got a response.
    Network,
    /// Server failed or answered garbage.
    Server,
    /// Local optimistic edit reverted.
    Rollback,
}

impl ClientError {
    /// Map an unsuccessful HTTP status and body to an error.
    pub fn from_status(status: u16, body: ApiErrorBody) -> Self {
        match status {
            400 | 422 if body.has_field_errors() => Self::Validation { fields: body.fields },
            401 if body.is_token_invalid() => Self::SessionExpired { body },
            401 => Self::Unauthorized { body },
            403 => Self::Forbidden(body.message()),
            404 => Self::NotFound(body.message()),
            500..=599 => Self::ServerError { status, message: body.message() },
            _ => Self::Rejected { status, body },
        }
    }

    /// Wrap a failure that caused an optimistic edit to be reverted.
    pub fn rollback(source: Self) -> Self {
        Self::Rollback { source: Box::new(source) }
    }

    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::SessionExpired { .. } => ErrorKind::AuthExpired,
            Self::Unauthorized { .. } | Self::Forbidden(_) => ErrorKind::Authorization,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Request(_) => ErrorKind::Network,
            Self::Rejected { .. } => ErrorKind::Validation,
            Self::Config(_) | Self::InvalidResponse(_) | Self::ServerError { .. } => {
                ErrorKind::Server
            },
            Self::Rollback { .. } => ErrorKind::Rollback,
        }
    }

    /// Field errors, when this is a validation failure (possibly behind a rollback).
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields } => Some(fields),
            Self::Rollback { source } => source.field_errors(),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ClientError {
    fn from(fields: FieldErrors) -> Self {
        Self::Validation { fields }
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}
