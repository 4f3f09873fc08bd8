//! Reparent engine: cycle-safe subtree relocation.
//!
//! Moves never mutate the caller's forest. A successful move returns a new
//! forest; a rejected one returns a [`ReparentError`] and nothing else.

use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::entities::DepartmentId;
use crate::domain::error::ReparentError;

impl Forest {
    /// Move `dragged` (with its subtree) to the end of `target`'s children.
    ///
    /// Checked in order: self-move, both ids present, target not inside the
    /// dragged subtree, target not already the parent.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &self,
        dragged: &DepartmentId,
        target: &DepartmentId,
    ) -> Result<Forest, ReparentError> {
        if dragged == target {
            return Err(ReparentError::NoOp);
        }
        let dragged_idx = self
            .find(dragged)
            .ok_or_else(|| ReparentError::NotFound(dragged.clone()))?;
        let target_idx = self
            .find(target)
            .ok_or_else(|| ReparentError::NotFound(target.clone()))?;

        if self.is_descendant(dragged_idx, target_idx) {
            return Err(ReparentError::WouldCreateCycle {
                dragged: dragged.clone(),
                target: target.clone(),
            });
        }
        if self.get_node(dragged_idx).and_then(|n| n.parent) == Some(target_idx) {
            return Err(ReparentError::NoOp);
        }

        // Indices stay valid in the clone
        let mut moved = self.clone();
        moved.detach(dragged_idx);
        moved.attach(dragged_idx, Some(target_idx));
        moved.recompute_levels_from(dragged_idx);

        debug!("moved {} under {}", dragged, target);
        Ok(moved)
    }

    /// Move `dragged` (with its subtree) to the end of the root list.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to_root(&self, dragged: &DepartmentId) -> Result<Forest, ReparentError> {
        let dragged_idx = self
            .find(dragged)
            .ok_or_else(|| ReparentError::NotFound(dragged.clone()))?;
        if self.get_node(dragged_idx).and_then(|n| n.parent).is_none() {
            return Err(ReparentError::NoOp);
        }

        let mut moved = self.clone();
        moved.detach(dragged_idx);
        moved.attach(dragged_idx, None);
        moved.recompute_levels_from(dragged_idx);

        debug!("moved {} to root", dragged);
        Ok(moved)
    }
}

/// Reparent `dragged` under `target`, or onto the root list when `target` is None.
pub fn move_department(
    forest: &Forest,
    dragged: &DepartmentId,
    target: Option<&DepartmentId>,
) -> Result<Forest, ReparentError> {
    match target {
        Some(target) => forest.move_node(dragged, target),
        None => forest.move_to_root(dragged),
    }
}
