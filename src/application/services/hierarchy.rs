//! Department hierarchy service
//!
//! Holds the single client-side snapshot of the forest and reconciles it
//! against the department store. Every structural change is decided by the
//! engine first, then persisted; a failed persist discards the local result
//! and refetches.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    compute_stats, flatten, move_department, BuildReport, Department, DepartmentId,
    DepartmentPatch, DepartmentQuery, Forest, ForestBuilder, NewDepartment, Selection, Stats,
};
use crate::infrastructure::DepartmentStore;

/// Service for viewing and reshaping a company's department hierarchy.
pub struct HierarchyService {
    store: Arc<dyn DepartmentStore>,
    company_id: Option<String>,
    builder: ForestBuilder,
    forest: Forest,
    report: BuildReport,
    selection: Selection,
}

impl HierarchyService {
    /// Create a service with an empty snapshot. Call [`refresh`](Self::refresh) to load.
    pub fn new(store: Arc<dyn DepartmentStore>, company_id: Option<String>) -> Self {
        Self {
            store,
            company_id,
            builder: ForestBuilder::new(),
            forest: Forest::new(),
            report: BuildReport::default(),
            selection: Selection::new(),
        }
    }

    /// Sort children by name on every rebuild.
    pub fn sort_children(mut self, sort: bool) -> Self {
        self.builder = self.builder.sort_children(sort);
        self
    }

    /// Current snapshot.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Anomalies repaired during the last rebuild.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Refetch all records and rebuild the snapshot.
    ///
    /// Selected ids that no longer exist are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn refresh(&mut self) -> ApplicationResult<&BuildReport> {
        let records = self
            .store
            .fetch_all(self.company_id.as_deref())
            .map_err(|e| ApplicationError::store("fetch departments", e))?;
        let (forest, report) = self.builder.build(&records);
        for issue in &report.issues {
            warn!("{}", issue);
        }
        self.forest = forest;
        self.report = report;
        self.selection.prune(&self.forest);
        debug!("snapshot rebuilt with {} departments", self.forest.len());
        Ok(&self.report)
    }

    /// Pruned forest for a query.
    pub fn visible(&self, query: &DepartmentQuery) -> Forest {
        query.apply(&self.forest)
    }

    /// Pre-order list of visible departments, for list and grid views.
    pub fn visible_list(&self, query: &DepartmentQuery) -> Vec<Department> {
        flatten(&self.visible(query))
    }

    /// Statistics over the visible departments.
    pub fn stats(&self, query: &DepartmentQuery) -> Stats {
        compute_stats(&self.visible_list(query))
    }

    /// Reparent `dragged` under `target` (or to root when None) and persist.
    ///
    /// Engine rejections leave the snapshot unchanged. If the store fails
    /// after a successful local move, the local result is discarded and the
    /// snapshot refetched.
    #[instrument(level = "debug", skip(self))]
    pub fn move_department(
        &mut self,
        dragged: &DepartmentId,
        target: Option<&DepartmentId>,
    ) -> ApplicationResult<()> {
        let moved = move_department(&self.forest, dragged, target)?;

        if let Err(e) = self.store.set_parent(dragged, target) {
            warn!("persisting move of {} failed, refetching: {}", dragged, e);
            if let Err(refetch) = self.refresh() {
                warn!("refetch after failed move also failed: {}", refetch);
            }
            return Err(ApplicationError::store(
                format!("persist move of {dragged}"),
                e,
            ));
        }

        self.forest = moved;
        info!(
            "moved {} under {}",
            dragged,
            target.map(|t| t.to_string()).unwrap_or_else(|| "root".into())
        );
        Ok(())
    }

    /// Validate and create a department, then refetch.
    #[instrument(level = "debug", skip(self, input), fields(name = %input.name))]
    pub fn create(&mut self, mut input: NewDepartment) -> ApplicationResult<Department> {
        input.validate()?;
        if let Some(parent) = &input.parent_id {
            if !self.forest.contains(parent) {
                return Err(ApplicationError::NotFound(parent.clone()));
            }
        }
        if input.company_id.is_none() {
            input.company_id = self.company_id.clone();
        }
        let created = self
            .store
            .create(&input)
            .map_err(|e| ApplicationError::store("create department", e))?;
        self.refresh()?;
        info!("created {}", created);
        Ok(created)
    }

    /// Validate and apply a partial update, then refetch.
    #[instrument(level = "debug", skip(self, patch))]
    pub fn update(
        &mut self,
        id: &DepartmentId,
        mut patch: DepartmentPatch,
    ) -> ApplicationResult<Department> {
        patch.validate()?;
        if !self.forest.contains(id) {
            return Err(ApplicationError::NotFound(id.clone()));
        }
        let updated = self
            .store
            .update(id, &patch)
            .map_err(|e| ApplicationError::store(format!("update {id}"), e))?;
        self.refresh()?;
        Ok(updated)
    }

    /// Delete a department. Its children are promoted by the store.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: &DepartmentId) -> ApplicationResult<()> {
        if !self.forest.contains(id) {
            return Err(ApplicationError::NotFound(id.clone()));
        }
        let promoted = self.forest.children_of(id).len();
        self.store
            .delete(id)
            .map_err(|e| ApplicationError::store(format!("delete {id}"), e))?;
        self.refresh()?;
        info!("deleted {}, {} children promoted", id, promoted);
        Ok(())
    }

    /// Flip selection of a department present in the snapshot.
    pub fn toggle_selection(&mut self, id: &DepartmentId) -> ApplicationResult<bool> {
        if !self.forest.contains(id) {
            return Err(ApplicationError::NotFound(id.clone()));
        }
        Ok(self.selection.toggle(id))
    }

    /// Select exactly the departments visible under `query`.
    pub fn select_all_visible(&mut self, query: &DepartmentQuery) {
        let visible = self.visible_list(query).into_iter().map(|d| d.id);
        self.selection.select_all_visible(visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
