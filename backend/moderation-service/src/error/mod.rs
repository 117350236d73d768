use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Write-path failure, already carrying the "Failed to <op>: <cause>" message
    #[error("{0}")]
    Store(String),

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid queue status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModerationError {
    /// Wrap a write-path failure with the operation name
    pub fn store(operation: &str, err: impl std::fmt::Display) -> Self {
        ModerationError::Store(format!("Failed to {}: {}", operation, err))
    }

    fn kind(&self) -> &'static str {
        match self {
            ModerationError::Database(_) | ModerationError::Store(_) => "database_error",
            ModerationError::Analyzer(_) | ModerationError::Http(_) => "analyzer_error",
            ModerationError::Config(_) | ModerationError::Internal(_) => "server_error",
            ModerationError::InvalidInput(_) => "validation_error",
            ModerationError::NotFound(_) => "not_found_error",
            ModerationError::InvalidStatusTransition { .. } => "conflict_error",
            ModerationError::Unauthorized(_) => "authentication_error",
        }
    }
}

impl From<validator::ValidationErrors> for ModerationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ModerationError::InvalidInput(errors.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    status: u16,
}

impl ResponseError for ModerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModerationError::Database(_)
            | ModerationError::Store(_)
            | ModerationError::Config(_)
            | ModerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModerationError::Analyzer(_) | ModerationError::Http(_) => StatusCode::BAD_GATEWAY,
            ModerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ModerationError::NotFound(_) => StatusCode::NOT_FOUND,
            ModerationError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            ModerationError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            ModerationError::Database(e) => tracing::error!("Database error: {:?}", e),
            ModerationError::Store(msg) => tracing::error!("Store error: {}", msg),
            ModerationError::Http(e) => tracing::error!("HTTP error: {:?}", e),
            ModerationError::Analyzer(msg) => tracing::warn!("Analyzer error: {}", msg),
            ModerationError::Config(msg) | ModerationError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg)
            }
            _ => {}
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            status: status.as_u16(),
        })
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;
