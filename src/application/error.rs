//! Application-level errors (wraps domain and store errors)

use thiserror::Error;

use crate::domain::{DepartmentId, ReparentError, ValidationError};
use crate::infrastructure::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Reparent(#[from] ReparentError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("department not found: {0}")]
    NotFound(DepartmentId),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

impl ApplicationError {
    /// Wrap a store failure with the action that triggered it.
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
