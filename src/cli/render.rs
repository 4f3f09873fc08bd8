/*
Text projections of a forest for the terminal.

termtree::Tree is an owned recursive type, so the arena is walked from each
root and every child subtree is built before being pushed onto its parent.
 */
use colored::Colorize;
use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::{Department, Forest};

pub trait TreeDisplay {
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeDisplay for Forest {
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn build_tree(forest: &Forest, node_idx: Index) -> Option<Tree<String>> {
            let node = forest.get_node(node_idx)?;
            let leaves = node
                .children
                .iter()
                .filter_map(|&child| build_tree(forest, child))
                .collect::<Vec<_>>();
            Some(Tree::new(label(&node.data)).with_leaves(leaves))
        }

        self.roots()
            .iter()
            .filter_map(|&root| build_tree(self, root))
            .collect()
    }
}

/// One-line description of a department.
pub fn label(dept: &Department) -> String {
    let mut details = vec![format!("{} users", dept.user_count)];
    if let Some(manager) = dept.manager_name.as_deref().or(dept.manager_id.as_deref()) {
        details.push(format!("manager: {manager}"));
    }
    let text = format!(
        "{} [{}] ({})",
        dept.name,
        dept.id,
        details.iter().join(", ")
    );
    if dept.is_active {
        text
    } else {
        format!("{} {}", text.dimmed(), "inactive".yellow())
    }
}

/// Indented list line for the flat view.
pub fn list_line(dept: &Department) -> String {
    format!("{}{}", "  ".repeat(dept.level as usize), label(dept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::build_forest;

    #[test]
    fn given_forest_when_rendering_then_one_tree_per_root() {
        colored::control::set_override(false);
        let forest = build_forest(&[
            Department::new("1", "Root"),
            Department::new("2", "Child").with_parent("1"),
            Department::new("3", "Other"),
        ]);
        let trees = forest.to_tree_strings();
        assert_eq!(trees.len(), 2);
        let rendered = trees[0].to_string();
        assert!(rendered.contains("Root [1]"));
        assert!(rendered.contains("Child [2]"));
    }

    #[test]
    fn given_nested_department_when_listing_then_indented_by_level() {
        colored::control::set_override(false);
        let mut dept = Department::new("2", "Child").with_manager("u1", "Ann");
        dept.level = 2;
        let line = list_line(&dept);
        assert!(line.starts_with("    Child [2]"));
        assert!(line.contains("manager: Ann"));
    }
}
