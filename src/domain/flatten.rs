//! Flattener: depth-first ordered views over a forest.

use crate::domain::arena::Forest;
use crate::domain::entities::{Department, NestedDepartment};

/// Pre-order list of all departments, children stripped.
///
/// Node before its children, children in order. Used by the list and grid
/// views and by the statistics aggregator.
pub fn flatten(forest: &Forest) -> Vec<Department> {
    forest.iter().map(|(_, node)| node.data.clone()).collect()
}

/// Borrowing variant of [`flatten`].
pub fn flatten_refs(forest: &Forest) -> Vec<&Department> {
    forest.iter().map(|(_, node)| &node.data).collect()
}

/// Pre-order list where every entry keeps its own subtree.
pub fn flatten_with_children(forest: &Forest) -> Vec<NestedDepartment> {
    forest
        .iter()
        .filter_map(|(idx, _)| forest.nested_from(idx))
        .collect()
}

/// Pre-order flattening of an owned nested projection.
pub fn flatten_nested(nodes: &[NestedDepartment]) -> Vec<Department> {
    let mut out = Vec::new();
    let mut stack: Vec<&NestedDepartment> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.department.clone());
        stack.extend(node.children.iter().rev());
    }
    out
}
