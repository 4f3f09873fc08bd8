//! Filter/search engine: shape-preserving pruning of a forest.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::entities::Department;

/// Keep every node that matches `predicate` or has a kept descendant.
///
/// Kept nodes stay under their original ancestors; a match is never hoisted
/// to root. Levels carry over unchanged since every ancestor of a kept node
/// is kept too.
#[instrument(level = "debug", skip_all, fields(nodes = forest.len()))]
pub fn filter<P>(forest: &Forest, predicate: P) -> Forest
where
    P: Fn(&Department) -> bool,
{
    // Post-order: children are decided before their parent
    let mut keep: HashSet<Index> = HashSet::new();
    for (idx, node) in forest.iter_postorder() {
        if predicate(&node.data) || node.children.iter().any(|c| keep.contains(c)) {
            keep.insert(idx);
        }
    }

    let mut pruned = Forest::new();
    let mut mapping: HashMap<Index, Index> = HashMap::with_capacity(keep.len());
    for (idx, node) in forest.iter() {
        if !keep.contains(&idx) {
            continue;
        }
        let Some(new_idx) = pruned.insert_detached(node.data.clone()) else {
            continue;
        };
        let parent = node.parent.and_then(|p| mapping.get(&p).copied());
        pruned.attach(new_idx, parent);
        mapping.insert(idx, new_idx);
    }

    debug!("filter kept {} of {} nodes", pruned.len(), forest.len());
    pruned
}

/// Text search plus active/inactive toggle, as used by the department views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentQuery {
    /// Case-insensitive substring matched against name and description
    pub text: Option<String>,
    /// Inactive departments are hidden unless set
    pub include_inactive: bool,
}

impl DepartmentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    /// True if the query matches every department.
    pub fn is_unrestricted(&self) -> bool {
        self.include_inactive && self.needle().is_none()
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, department: &Department) -> bool {
        if !self.include_inactive && !department.is_active {
            return false;
        }
        match self.needle() {
            None => true,
            Some(needle) => {
                department.name.to_lowercase().contains(&needle)
                    || department
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }

    /// Prune `forest` to the departments this query shows.
    pub fn apply(&self, forest: &Forest) -> Forest {
        if self.is_unrestricted() {
            return forest.clone();
        }
        filter(forest, |d| self.matches(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build_forest;
    use crate::domain::flatten::flatten;

    fn forest() -> Forest {
        build_forest(&[
            Department::new("1", "Company"),
            Department::new("2", "Engineering").with_parent("1"),
            Department::new("3", "Backend").with_parent("2"),
            Department::new("4", "Marketing")
                .with_parent("1")
                .with_description("Brand and growth"),
            Department::new("5", "Legacy").with_parent("1").inactive(),
        ])
    }

    fn ids(forest: &Forest) -> Vec<String> {
        flatten(forest).into_iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn given_deep_match_when_filtering_then_ancestor_chain_kept() {
        let pruned = filter(&forest(), |d| d.name == "Backend");
        assert_eq!(ids(&pruned), vec!["1", "2", "3"]);
        assert_eq!(pruned.roots().len(), 1);
        assert_eq!(pruned.get(&"3".into()).unwrap().level, 2);
        assert_eq!(
            pruned.get(&"3".into()).unwrap().parent_id,
            Some("2".into())
        );
    }

    #[test]
    fn given_no_match_when_filtering_then_empty() {
        assert!(filter(&forest(), |_| false).is_empty());
    }

    #[test]
    fn given_query_text_when_applying_then_matches_description_case_insensitive() {
        let pruned = DepartmentQuery::new().text("GROWTH").apply(&forest());
        assert_eq!(ids(&pruned), vec!["1", "4"]);
    }

    #[test]
    fn given_default_query_when_applying_then_inactive_hidden() {
        let pruned = DepartmentQuery::new().apply(&forest());
        assert!(!pruned.contains(&"5".into()));
        assert_eq!(pruned.len(), 4);
    }

    #[test]
    fn given_include_inactive_when_applying_then_everything_kept() {
        let query = DepartmentQuery::new().include_inactive(true);
        assert!(query.is_unrestricted());
        assert_eq!(query.apply(&forest()).len(), 5);
    }

    #[test]
    fn given_inactive_ancestor_of_match_when_applying_then_ancestor_kept() {
        let f = build_forest(&[
            Department::new("1", "Old division").inactive(),
            Department::new("2", "Support").with_parent("1"),
        ]);
        let pruned = DepartmentQuery::new().text("support").apply(&f);
        assert_eq!(ids(&pruned), vec!["1", "2"]);
    }

    #[test]
    fn given_blank_text_when_matching_then_treated_as_no_text() {
        let query = DepartmentQuery::new().text("   ");
        assert!(query.matches(&Department::new("9", "Anything")));
    }
}
