//! Tree builder: turns flat department records into a forest.

use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::entities::{Department, DepartmentId};

/// Anomaly found in the raw records and resolved while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildIssue {
    /// `parent_id` pointed at a missing record; the node became a root.
    DanglingParent {
        id: DepartmentId,
        parent_id: DepartmentId,
    },
    /// A later record repeated an id; it was skipped.
    DuplicateId(DepartmentId),
    /// The parent link closed a cycle; it was cut and the node became a root.
    CycleBroken {
        id: DepartmentId,
        parent_id: DepartmentId,
    },
}

impl fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildIssue::DanglingParent { id, parent_id } => {
                write!(f, "{id}: parent {parent_id} not found, promoted to root")
            }
            BuildIssue::DuplicateId(id) => write!(f, "{id}: duplicate id skipped"),
            BuildIssue::CycleBroken { id, parent_id } => {
                write!(f, "{id}: link to {parent_id} forms a cycle, promoted to root")
            }
        }
    }
}

/// Issues collected during a build. Empty for well-formed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub issues: Vec<BuildIssue>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Constructs forests from flat department records.
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    sort_children: bool,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort roots and children by name after building (input order otherwise).
    pub fn sort_children(mut self, sort: bool) -> Self {
        self.sort_children = sort;
        self
    }

    /// Build a forest and report anything that had to be repaired.
    ///
    /// Children keep input order. Records whose parent is missing are
    /// promoted to root rather than dropped. Levels are recomputed from the
    /// resulting shape; incoming `level` values are ignored.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[Department]) -> (Forest, BuildReport) {
        let mut forest = Forest::new();
        let mut report = BuildReport::default();

        // Lookup table: every record stored once, detached
        let mut placed: Vec<(Index, Option<DepartmentId>)> = Vec::with_capacity(records.len());
        for record in records {
            let mut data = record.clone();
            let parent_id = data.parent_id.take();
            match forest.insert_detached(data) {
                Some(idx) => placed.push((idx, parent_id)),
                None => {
                    warn!("duplicate department id skipped: {}", record.id);
                    report.issues.push(BuildIssue::DuplicateId(record.id.clone()));
                }
            }
        }

        // Link in input order
        for (idx, parent_id) in placed {
            let parent = match parent_id {
                None => None,
                Some(pid) => match forest.find(&pid) {
                    None => {
                        let id = node_id(&forest, idx);
                        warn!("dangling parent {} for {}, promoting to root", pid, id);
                        report.issues.push(BuildIssue::DanglingParent { id, parent_id: pid });
                        None
                    }
                    Some(pidx) if closes_cycle(&forest, idx, pidx) => {
                        let id = node_id(&forest, idx);
                        warn!("parent link {} -> {} forms a cycle, promoting to root", id, pid);
                        report.issues.push(BuildIssue::CycleBroken { id, parent_id: pid });
                        None
                    }
                    Some(pidx) => Some(pidx),
                },
            };
            forest.attach(idx, parent);
        }

        forest.recompute_all_levels();
        if self.sort_children {
            forest.sort_children_by_name();
        }

        debug!(
            "built forest: {} nodes, {} roots, {} issues",
            forest.len(),
            forest.roots().len(),
            report.issues.len()
        );
        (forest, report)
    }
}

/// Build a forest from flat records, promoting dangling parents to root.
pub fn build_forest(records: &[Department]) -> Forest {
    ForestBuilder::new().build(records).0
}

fn node_id(forest: &Forest, idx: Index) -> DepartmentId {
    forest
        .get_node(idx)
        .map(|n| n.data.id.clone())
        .unwrap_or_else(|| DepartmentId::new(""))
}

/// True if making `parent` the parent of `node` would make `node` its own ancestor.
///
/// Only links attached so far are considered, so the cut lands on the link
/// that closes the cycle in input order.
fn closes_cycle(forest: &Forest, node: Index, parent: Index) -> bool {
    let mut current = Some(parent);
    while let Some(idx) = current {
        if idx == node {
            return true;
        }
        current = forest.get_node(idx).and_then(|n| n.parent);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(forest: &Forest) -> Vec<String> {
        forest.iter().map(|(_, n)| n.data.id.to_string()).collect()
    }

    #[test]
    fn given_empty_input_when_building_then_returns_empty_forest() {
        let (forest, report) = ForestBuilder::new().build(&[]);
        assert!(forest.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn given_child_before_parent_when_building_then_links_anyway() {
        let records = vec![
            Department::new("2", "Child").with_parent("1"),
            Department::new("1", "Root"),
        ];
        let forest = build_forest(&records);
        assert_eq!(ids(&forest), vec!["1", "2"]);
        assert_eq!(forest.get(&"2".into()).unwrap().level, 1);
    }

    #[test]
    fn given_stale_server_levels_when_building_then_levels_are_recomputed() {
        let mut root = Department::new("1", "Root");
        root.level = 3;
        let mut child = Department::new("2", "Child").with_parent("1");
        child.level = 9;
        let forest = build_forest(&[root, child]);
        assert_eq!(forest.get(&"1".into()).unwrap().level, 0);
        assert_eq!(forest.get(&"2".into()).unwrap().level, 1);
    }

    #[test]
    fn given_duplicate_ids_when_building_then_first_wins() {
        let records = vec![
            Department::new("1", "First"),
            Department::new("1", "Second"),
        ];
        let (forest, report) = ForestBuilder::new().build(&records);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.get(&"1".into()).unwrap().name, "First");
        assert_eq!(
            report.issues,
            vec![BuildIssue::DuplicateId(DepartmentId::from("1"))]
        );
    }

    #[test]
    fn given_parent_cycle_in_records_when_building_then_cuts_closing_link() {
        let records = vec![
            Department::new("a", "A").with_parent("b"),
            Department::new("b", "B").with_parent("a"),
        ];
        let (forest, report) = ForestBuilder::new().build(&records);

        assert_eq!(forest.len(), 2);
        assert_eq!(ids(&forest), vec!["b", "a"]);
        assert!(forest.get(&"b".into()).unwrap().is_root());
        assert_eq!(forest.get(&"a".into()).unwrap().level, 1);
        assert_eq!(
            report.issues,
            vec![BuildIssue::CycleBroken {
                id: "b".into(),
                parent_id: "a".into()
            }]
        );
    }

    #[test]
    fn given_self_parent_when_building_then_promoted_to_root() {
        let (forest, report) =
            ForestBuilder::new().build(&[Department::new("x", "X").with_parent("x")]);
        assert!(forest.get(&"x".into()).unwrap().is_root());
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn given_sort_option_when_building_then_roots_sorted_by_name() {
        let records = vec![
            Department::new("1", "Support"),
            Department::new("2", "Finance"),
        ];
        let (forest, _) = ForestBuilder::new().sort_children(true).build(&records);
        assert_eq!(ids(&forest), vec!["2", "1"]);
    }
}
