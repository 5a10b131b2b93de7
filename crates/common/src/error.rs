//! Error types for castroom.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Operator Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Cannot {action} a post in status {from}")]
    InvalidTransition { from: String, action: String },

    #[error("Confirmation does not match: expected {expected}")]
    ConfirmationMismatch { expected: String },

    // === System Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code reported to the operator.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::Precondition(_) => "PRECONDITION_FAILED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConfirmationMismatch { .. } => "CONFIRMATION_MISMATCH",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same action later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_) | Self::ExternalService(_))
    }

    /// Build an [`AppError::InvalidTransition`].
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Serialization failed: {err}"))
    }
}
