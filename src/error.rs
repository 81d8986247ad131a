//! Error types for chat-relay
//!
//! All errors implement `IntoResponse` for Axum handlers. Validation errors
//! are reported verbatim; everything else collapses into one generic message
//! so upstream or configuration detail never reaches the caller.

use crate::history::HistoryError;
use crate::provider::ProviderError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body text for a missing, unparseable or empty JSON payload
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid or missing JSON payload";

/// Body text for a missing or blank `message`
pub const EMPTY_MESSAGE_MESSAGE: &str = "Message cannot be empty";

/// Body text for every internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "The assistant encountered an internal server error.";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid or missing JSON payload")]
    InvalidPayload,

    #[error("Message cannot be empty")]
    EmptyMessage,

    /// Body or `message` of a type the relay cannot read; reported like any internal failure
    #[error("Cannot read {field} from a JSON {kind}")]
    UnexpectedShape {
        field: &'static str,
        kind: &'static str,
    },

    #[error("History translation failed: {0}")]
    History(#[from] HistoryError),

    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload | Self::EmptyMessage => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is a server-side failure that must be logged and masked
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Caller-facing message; internal detail is replaced by a generic message
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidPayload => INVALID_PAYLOAD_MESSAGE,
            Self::EmptyMessage => EMPTY_MESSAGE_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// Outcome tag carried by every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Error body: `{"error": "...", "status": "error"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: ResponseStatus,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message().to_string(),
            status: ResponseStatus::Error,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
