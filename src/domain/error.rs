//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::DepartmentId;

/// Rejections from the reparent engine.
///
/// All variants are recoverable: the caller's forest is left untouched and
/// the message is suitable for showing to a user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReparentError {
    #[error("department is already in that position")]
    NoOp,

    #[error("department not found: {0}")]
    NotFound(DepartmentId),

    #[error("cannot move a department into its own sub-department: {dragged} -> {target}")]
    WouldCreateCycle {
        dragged: DepartmentId,
        target: DepartmentId,
    },
}

/// Input rejected at the edge before it reaches a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be at least {min} characters, got {actual}")]
    NameTooShort { min: usize, actual: usize },

    #[error("name must be at most {max} characters, got {actual}")]
    NameTooLong { max: usize, actual: usize },

    #[error("description must be at most {max} characters, got {actual}")]
    DescriptionTooLong { max: usize, actual: usize },
}
