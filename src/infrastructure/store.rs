//! Department store implementations
//!
//! Both stores share [`DepartmentTable`], which applies the node store
//! contract to a flat list of records: delete promotes children to the
//! deleted node's parent, reparents are validated with the engine, and the
//! stored `level` hint is refreshed after every structural change.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::{
    build_forest, move_department, Department, DepartmentId, DepartmentPatch, NewDepartment,
    ReparentError,
};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::DepartmentStore;

/// Flat list of department records, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentTable {
    records: Vec<Department>,
}

impl DepartmentTable {
    pub fn new(records: Vec<Department>) -> Self {
        let mut table = Self { records };
        table.refresh_levels();
        table
    }

    pub fn records(&self) -> &[Department] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Department> {
        self.records
    }

    fn position(&self, id: &DepartmentId) -> StoreResult<usize> {
        self.records
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub fn fetch(&self, company_id: Option<&str>) -> Vec<Department> {
        self.records
            .iter()
            .filter(|d| company_id.is_none() || d.company_id.as_deref() == company_id)
            .cloned()
            .collect()
    }

    pub fn create(&mut self, input: &NewDepartment) -> StoreResult<Department> {
        if let Some(parent) = &input.parent_id {
            self.position(parent)?;
        }
        let department = Department {
            id: DepartmentId::generate(),
            name: input.name.clone(),
            description: input.description.clone(),
            is_active: true,
            parent_id: input.parent_id.clone(),
            level: 0,
            manager_id: input.manager_id.clone(),
            manager_name: input.manager_name.clone(),
            user_count: 0,
            company_id: input.company_id.clone(),
        };
        let id = department.id.clone();
        self.records.push(department);
        self.refresh_levels();
        self.get(&id)
    }

    pub fn update(&mut self, id: &DepartmentId, patch: &DepartmentPatch) -> StoreResult<Department> {
        let pos = self.position(id)?;
        patch.apply_to(&mut self.records[pos]);
        Ok(self.records[pos].clone())
    }

    pub fn set_parent(
        &mut self,
        id: &DepartmentId,
        parent: Option<&DepartmentId>,
    ) -> StoreResult<Department> {
        let pos = self.position(id)?;
        if parent == Some(id) {
            return Err(StoreError::Rejected(format!("{id} cannot be its own parent")));
        }
        let forest = build_forest(&self.records);
        match move_department(&forest, id, parent) {
            Ok(_) => {}
            Err(ReparentError::NoOp) => return self.get(id),
            Err(ReparentError::NotFound(missing)) => return Err(StoreError::NotFound(missing)),
            Err(e) => return Err(StoreError::Rejected(e.to_string())),
        }
        // Moved nodes become the last child of their new parent
        let mut record = self.records.remove(pos);
        record.parent_id = parent.cloned();
        self.records.push(record);
        self.refresh_levels();
        self.get(id)
    }

    /// Remove a record; its children move up to its former parent.
    pub fn delete(&mut self, id: &DepartmentId) -> StoreResult<Department> {
        let pos = self.position(id)?;
        let removed = self.records.remove(pos);
        let mut promoted = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|d| d.parent_id.as_ref() == Some(id))
        {
            record.parent_id = removed.parent_id.clone();
            promoted += 1;
        }
        debug!("deleted {}, promoted {} children", id, promoted);
        self.refresh_levels();
        Ok(removed)
    }

    fn get(&self, id: &DepartmentId) -> StoreResult<Department> {
        let pos = self.position(id)?;
        Ok(self.records[pos].clone())
    }

    fn refresh_levels(&mut self) {
        let forest = build_forest(&self.records);
        for record in &mut self.records {
            if let Some(built) = forest.get(&record.id) {
                record.level = built.level;
            }
        }
    }
}

/// Store holding records in memory. Used for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<DepartmentTable>,
}

impl InMemoryStore {
    pub fn new(records: Vec<Department>) -> Self {
        Self {
            table: RwLock::new(DepartmentTable::new(records)),
        }
    }

    fn with_table<T>(
        &self,
        f: impl FnOnce(&mut DepartmentTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        f(&mut table)
    }
}

impl DepartmentStore for InMemoryStore {
    fn fetch_all(&self, company_id: Option<&str>) -> StoreResult<Vec<Department>> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(table.fetch(company_id))
    }

    fn create(&self, input: &NewDepartment) -> StoreResult<Department> {
        self.with_table(|t| t.create(input))
    }

    fn update(&self, id: &DepartmentId, patch: &DepartmentPatch) -> StoreResult<Department> {
        self.with_table(|t| t.update(id, patch))
    }

    fn set_parent(
        &self,
        id: &DepartmentId,
        parent: Option<&DepartmentId>,
    ) -> StoreResult<Department> {
        self.with_table(|t| t.set_parent(id, parent))
    }

    fn delete(&self, id: &DepartmentId) -> StoreResult<()> {
        self.with_table(|t| t.delete(id).map(|_| ()))
    }
}

/// Store backed by a JSON array of department records on disk.
///
/// Every call re-reads the file; writes replace it atomically. A missing
/// file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> StoreResult<DepartmentTable> {
        if !self.path.exists() {
            debug!("snapshot file missing, starting empty");
            return Ok(DepartmentTable::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("read {}", self.path.display()), e))?;
        if content.trim().is_empty() {
            return Ok(DepartmentTable::default());
        }
        let records: Vec<Department> = serde_json::from_str(&content)
            .map_err(|e| StoreError::json(format!("parse {}", self.path.display()), e))?;
        Ok(DepartmentTable::new(records))
    }

    #[instrument(level = "debug", skip(self, table), fields(path = %self.path.display()))]
    pub fn save(&self, table: &DepartmentTable) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::io(format!("create {}", dir.display()), e))?;

        let json = serde_json::to_string_pretty(table.records())
            .map_err(|e| StoreError::json("serialize departments", e))?;
        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::io(format!("temp file in {}", dir.display()), e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .map_err(|e| StoreError::io("write snapshot", e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(format!("replace {}", self.path.display()), e.error))?;
        Ok(())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut DepartmentTable) -> StoreResult<T>) -> StoreResult<T> {
        let mut table = self.load()?;
        let out = f(&mut table)?;
        self.save(&table)?;
        Ok(out)
    }
}

impl DepartmentStore for JsonFileStore {
    fn fetch_all(&self, company_id: Option<&str>) -> StoreResult<Vec<Department>> {
        Ok(self.load()?.fetch(company_id))
    }

    fn create(&self, input: &NewDepartment) -> StoreResult<Department> {
        self.mutate(|t| t.create(input))
    }

    fn update(&self, id: &DepartmentId, patch: &DepartmentPatch) -> StoreResult<Department> {
        self.mutate(|t| t.update(id, patch))
    }

    fn set_parent(
        &self,
        id: &DepartmentId,
        parent: Option<&DepartmentId>,
    ) -> StoreResult<Department> {
        self.mutate(|t| t.set_parent(id, parent))
    }

    fn delete(&self, id: &DepartmentId) -> StoreResult<()> {
        self.mutate(|t| t.delete(id).map(|_| ()))
    }
}
