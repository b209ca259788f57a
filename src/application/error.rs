//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, ValidationError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// True when the user can fix the input and re-submit.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApplicationError::Domain(DomainError::Validation(_)))
    }
}

impl From<ValidationError> for ApplicationError {
    fn from(err: ValidationError) -> Self {
        ApplicationError::Domain(err.into())
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
