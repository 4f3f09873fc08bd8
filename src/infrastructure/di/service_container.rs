//! Service container for dependency injection
//!
//! Wires up services with their dependencies.

use std::sync::Arc;

use crate::application::services::HierarchyService;
use crate::config::Settings;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::DepartmentStore;

/// Container holding settings and the department store.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Department store collaborator
    pub store: Arc<dyn DepartmentStore>,
}

impl ServiceContainer {
    /// Create a container backed by the configured snapshot file.
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(JsonFileStore::new(settings.data_file.clone()));
        Self::with_deps(settings, store)
    }

    /// Create a container with a custom store (for testing).
    pub fn with_deps(settings: Settings, store: Arc<dyn DepartmentStore>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, store }
    }

    /// Hierarchy service scoped to the configured company.
    pub fn hierarchy_service(&self) -> HierarchyService {
        HierarchyService::new(Arc::clone(&self.store), self.settings.company_id.clone())
            .sort_children(self.settings.sort_children)
    }
}
