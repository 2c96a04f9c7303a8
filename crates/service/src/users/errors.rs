use thiserror::Error;

use models::errors::ModelError;

use super::validator::ValidationError;

/// Business errors for user-account workflows
#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("email already exists")]
    EmailTaken,
    #[error("{0}")]
    PasswordMismatch(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            UserError::Validation(_) => 1001,
            UserError::EmailTaken => 1002,
            UserError::PasswordMismatch(_) => 1005,
            UserError::HashError(_) => 1101,
            UserError::Repository(_) => 1200,
        }
    }

    /// Symbolic error type, the name an error responder keys on.
    pub fn error_type(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "VALIDATION_ERROR",
            UserError::EmailTaken => "EMAIL_ALREADY_TAKEN",
            UserError::PasswordMismatch(_) => "INVALID_PASSWORD",
            UserError::HashError(_) => "SERVER",
            UserError::Repository(_) => "DB_ERROR",
        }
    }
}

impl From<ModelError> for UserError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Conflict(_) => UserError::EmailTaken,
            other => UserError::Repository(other.to_string()),
        }
    }
}
