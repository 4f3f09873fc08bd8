//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::{InfraError, StoreError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Serialize { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Reparent(_) | ApplicationError::Validation(_) => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::NotFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Store { source, .. } => match source {
                        StoreError::NotFound(_) => crate::exitcode::NOINPUT,
                        StoreError::Rejected(_) | StoreError::Json { .. } => {
                            crate::exitcode::DATAERR
                        }
                        StoreError::Io { .. } => crate::exitcode::IOERR,
                        StoreError::Unavailable(_) => crate::exitcode::UNAVAILABLE,
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReparentError;

    #[test]
    fn given_cycle_rejection_then_maps_to_dataerr() {
        let err: CliError = ApplicationError::Reparent(ReparentError::NoOp).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_usage_error_then_maps_to_usage() {
        assert_eq!(
            CliError::Usage("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
