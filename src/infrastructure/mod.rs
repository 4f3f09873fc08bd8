//! Infrastructure layer: store implementations and DI container
//!
//! This layer implements the collaborator traits and wires up services.

pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult, StoreError, StoreResult};
pub use store::{DepartmentTable, InMemoryStore, JsonFileStore};
pub use traits::DepartmentStore;
