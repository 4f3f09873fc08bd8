use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{Department, DepartmentId, NestedDepartment};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Department record for this node
    pub data: Department,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

/// Arena-based forest of departments.
///
/// Parents own their children by index. The parent link is an index lookup,
/// and the record's `parent_id` is kept in step with it by `attach`/`detach`.
/// Cloning the forest is a full deep copy.
#[derive(Debug, Clone)]
pub struct Forest {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Root nodes, in display order
    roots: Vec<Index>,
    /// Department id to arena index
    index: HashMap<DepartmentId, Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Store a node without placing it in the tree.
    ///
    /// The node is unreachable from the roots until `attach` is called.
    /// Returns None if the id is already present.
    #[instrument(level = "trace", skip(self, data), fields(id = %data.id))]
    pub(crate) fn insert_detached(&mut self, data: Department) -> Option<Index> {
        if self.index.contains_key(&data.id) {
            return None;
        }
        let id = data.id.clone();
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.index.insert(id, node_idx);
        Some(node_idx)
    }

    /// Insert a node as the last child of `parent` (or as the last root).
    ///
    /// Levels of the new node are set from the parent.
    pub fn insert_node(&mut self, data: Department, parent: Option<Index>) -> Option<Index> {
        let node_idx = self.insert_detached(data)?;
        self.attach(node_idx, parent);
        self.recompute_levels_from(node_idx);
        Some(node_idx)
    }

    /// Append a detached node to `parent`'s children, or to the roots.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn attach(&mut self, node_idx: Index, parent: Option<Index>) {
        let parent_id = match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => {
                parent_node.children.push(node_idx);
                Some(parent_node.data.id.clone())
            }
            None => {
                self.roots.push(node_idx);
                None
            }
        };
        if let Some(node) = self.arena.get_mut(node_idx) {
            node.parent = if parent_id.is_some() { parent } else { None };
            node.data.parent_id = parent_id;
        }
    }

    /// Remove a node from its parent's children (or from the roots).
    ///
    /// The node keeps its own subtree.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn detach(&mut self, node_idx: Index) {
        let parent = self.arena.get(node_idx).and_then(|n| n.parent);
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|&c| c != node_idx),
            None => self.roots.retain(|&r| r != node_idx),
        }
        if let Some(node) = self.arena.get_mut(node_idx) {
            node.parent = None;
            node.data.parent_id = None;
        }
    }

    /// Set `level` on a node from its parent and propagate through its subtree.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn recompute_levels_from(&mut self, node_idx: Index) {
        let start_level = self
            .arena
            .get(node_idx)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .map(|p| p.data.level + 1)
            .unwrap_or(0);

        let mut stack = vec![(node_idx, start_level)];
        while let Some((current_idx, level)) = stack.pop() {
            if let Some(node) = self.arena.get_mut(current_idx) {
                node.data.level = level;
                for &child in &node.children {
                    stack.push((child, level + 1));
                }
            }
        }
    }

    pub(crate) fn recompute_all_levels(&mut self) {
        for root in self.roots.clone() {
            self.recompute_levels_from(root);
        }
    }

    /// Stable sort of every child list and the root list by name.
    pub fn sort_children_by_name(&mut self) {
        let key = |arena: &Arena<TreeNode>, idx: &Index| {
            arena
                .get(*idx)
                .map(|n| n.data.name.to_lowercase())
                .unwrap_or_default()
        };

        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_cached_key(|idx| key(&self.arena, idx));
        self.roots = roots;

        let indices: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in indices {
            let mut children = match self.arena.get_mut(idx) {
                Some(node) => std::mem::take(&mut node.children),
                None => continue,
            };
            children.sort_by_cached_key(|c| key(&self.arena, c));
            if let Some(node) = self.arena.get_mut(idx) {
                node.children = children;
            }
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, id: &DepartmentId) -> Option<Index> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &DepartmentId) -> bool {
        self.index.contains_key(id)
    }

    /// Department record by id.
    pub fn get(&self, id: &DepartmentId) -> Option<&Department> {
        self.find(id)
            .and_then(|idx| self.arena.get(idx))
            .map(|n| &n.data)
    }

    /// Parent record of a department, None for roots and unknown ids.
    pub fn parent_of(&self, id: &DepartmentId) -> Option<&Department> {
        self.find(id)
            .and_then(|idx| self.arena.get(idx))
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .map(|n| &n.data)
    }

    /// Child records of a department, in order.
    pub fn children_of(&self, id: &DepartmentId) -> Vec<&Department> {
        self.find(id)
            .and_then(|idx| self.arena.get(idx))
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| self.arena.get(c))
                    .map(|c| &c.data)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over every root, children in order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.roots.clone())
    }

    /// Pre-order traversal of the subtree rooted at `idx`, starting with `idx`.
    pub fn iter_subtree(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, vec![idx])
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// True if `candidate` sits strictly below `ancestor`.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, ancestor: Index, candidate: Index) -> bool {
        self.iter_subtree(ancestor)
            .skip(1)
            .any(|(idx, _)| idx == candidate)
    }

    /// Ids of all departments below `id`, pre-order.
    pub fn descendant_ids(&self, id: &DepartmentId) -> Vec<DepartmentId> {
        match self.find(id) {
            Some(idx) => self
                .iter_subtree(idx)
                .skip(1)
                .map(|(_, n)| n.data.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Owned nested projection of the whole forest.
    pub fn to_nested(&self) -> Vec<NestedDepartment> {
        self.roots
            .iter()
            .filter_map(|&root| self.nested_from(root))
            .collect()
    }

    /// Owned nested projection of one subtree.
    pub fn nested_from(&self, node_idx: Index) -> Option<NestedDepartment> {
        let node = self.get_node(node_idx)?;
        Some(NestedDepartment {
            department: node.data.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.nested_from(c))
                .collect(),
        })
    }
}

pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest, mut start: Vec<Index>) -> Self {
        // Reverse so the first root is popped first
        start.reverse();
        Self {
            forest,
            stack: start,
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
