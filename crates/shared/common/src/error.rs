//! Unified error handling.
//!
//! Every failure the service can produce maps to one [`AppError`] variant with
//! a stable code, a log severity and an HTTP status. Internal causes are logged
//! when the response is built and never serialized to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::Level;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // Storage
    #[cfg(feature = "database")]
    #[error("Query execution failed")]
    Execution(#[from] sea_orm::DbErr),

    #[cfg(feature = "database")]
    #[error("Transaction commit failed")]
    Commit(#[source] sea_orm::DbErr),

    // Tokens and startup
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken(_) => "INVALID_TOKEN",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            #[cfg(feature = "database")]
            AppError::Execution(_) => "EXECUTION_ERROR",
            #[cfg(feature = "database")]
            AppError::Commit(_) => "COMMIT_ERROR",
            AppError::Signing(_) => "SIGNING_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log level for this error. Client mistakes are not server faults.
    pub fn severity(&self) -> Level {
        match self {
            AppError::Validation(_) | AppError::NotFound | AppError::Conflict(_) => Level::DEBUG,
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::InvalidToken(_) => {
                Level::WARN
            }
            _ => Level::ERROR,
        }
    }

    /// Whether this error came from the storage layer.
    pub fn is_execution(&self) -> bool {
        #[cfg(feature = "database")]
        {
            matches!(self, AppError::Execution(_) | AppError::Commit(_))
        }
        #[cfg(not(feature = "database"))]
        {
            false
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Conflict(msg) => {
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }
            AppError::InvalidToken(_) => "Invalid or expired token".to_string(),
            #[cfg(feature = "database")]
            AppError::Execution(_) | AppError::Commit(_) => {
                "A database error occurred".to_string()
            }
            AppError::Signing(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn log(&self) {
        let code = self.code();
        let detail = self.detail();
        match self.severity() {
            Level::ERROR => tracing::error!(code, detail = %detail, "request failed"),
            Level::WARN => tracing::warn!(code, detail = %detail, "request rejected"),
            _ => tracing::debug!(code, detail = %detail, "request rejected"),
        }
    }

    /// Full internal description, including the source chain.
    fn detail(&self) -> String {
        match self {
            #[cfg(feature = "database")]
            AppError::Execution(e) | AppError::Commit(e) => format!("{}: {}", self, e),
            AppError::Internal(msg) => format!("{}: {}", self, msg),
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidField { reason, .. } => AppError::Validation(reason),
            DomainError::WeakPassword(msg) => AppError::Validation(msg),
            DomainError::Hashing(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_token(reason: impl Into<String>) -> Self {
        AppError::InvalidToken(reason.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        AppError::Signing(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
