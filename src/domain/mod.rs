//! Domain layer: department hierarchy engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every operation is a synchronous function over an in-memory snapshot.

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod reparent;
pub mod selection;
pub mod stats;

pub use arena::{Forest, TreeNode};
pub use builder::{build_forest, BuildIssue, BuildReport, ForestBuilder};
pub use entities::*;
pub use error::{ReparentError, ValidationError};
pub use filter::{filter, DepartmentQuery};
pub use flatten::{flatten, flatten_nested, flatten_refs, flatten_with_children};
pub use reparent::move_department;
pub use selection::Selection;
pub use stats::{compute_stats, Stats};
