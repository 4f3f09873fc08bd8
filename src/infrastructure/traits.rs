//! Collaborator boundary traits
//!
//! The hierarchy engine never persists anything itself. These traits describe
//! the node store it is reconciled against, so services can run against an
//! in-memory table in tests and a snapshot file in the CLI.

use crate::domain::{Department, DepartmentId, DepartmentPatch, NewDepartment};
use crate::infrastructure::error::StoreResult;

/// Node store contract for department records.
pub trait DepartmentStore: Send + Sync {
    /// All departments of a company as flat records (no children).
    ///
    /// `None` returns every record the store holds.
    fn fetch_all(&self, company_id: Option<&str>) -> StoreResult<Vec<Department>>;

    /// Create a department; root placement when `parent_id` is absent.
    fn create(&self, input: &NewDepartment) -> StoreResult<Department>;

    /// Update name, description, manager or active flag.
    fn update(&self, id: &DepartmentId, patch: &DepartmentPatch) -> StoreResult<Department>;

    /// Persist a reparent decided by the engine.
    fn set_parent(&self, id: &DepartmentId, parent: Option<&DepartmentId>)
        -> StoreResult<Department>;

    /// Delete a department, promoting its children to its former parent.
    fn delete(&self, id: &DepartmentId) -> StoreResult<()>;
}
