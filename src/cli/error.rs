//! CLI-level errors (wraps application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script {path}: {message}")]
    Script { path: PathBuf, message: String },

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Script { .. } => crate::exitcode::DATAERR,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                crate::exitcode::NOINPUT
            }
            CliError::Io { .. } => crate::exitcode::IOERR,
            CliError::Application(ApplicationError::Config { .. }) => crate::exitcode::CONFIG,
            CliError::Application(_) => crate::exitcode::SOFTWARE,
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
