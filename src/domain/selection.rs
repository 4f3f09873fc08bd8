//! Selection manager: multi-select bookkeeping shared by all views.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::arena::Forest;
use crate::domain::entities::DepartmentId;

/// Set of selected department ids.
///
/// Independent of the projection being rendered. The selection does not
/// watch the forest; call [`Selection::prune`] after deletes or refetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<DepartmentId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns true if it is now selected.
    pub fn toggle(&mut self, id: &DepartmentId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Replace the selection with exactly the visible ids.
    pub fn select_all_visible<I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = DepartmentId>,
    {
        self.selected = visible.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &DepartmentId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DepartmentId> {
        self.selected.iter()
    }

    /// True if every visible id is selected and at least one is visible.
    pub fn is_all_selected<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a DepartmentId>,
    {
        let mut any = false;
        for id in visible {
            any = true;
            if !self.selected.contains(id) {
                return false;
            }
        }
        any
    }

    /// Drop ids no longer present in `forest`. Returns how many were removed.
    pub fn prune(&mut self, forest: &Forest) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| forest.contains(id));
        let removed = before - self.selected.len();
        if removed > 0 {
            debug!("pruned {} stale selected ids", removed);
        }
        removed
    }
}
