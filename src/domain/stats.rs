//! Statistics aggregator over flattened departments.

use std::fmt;

use serde::Serialize;

use crate::domain::entities::Department;

/// Summary counts for a set of departments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub total_users: u64,
    /// Deepest level present, 0 for empty input
    pub max_level: u32,
    pub with_managers: usize,
}

/// Reduce over departments (typically the flattener's output).
pub fn compute_stats<'a, I>(departments: I) -> Stats
where
    I: IntoIterator<Item = &'a Department>,
{
    departments
        .into_iter()
        .fold(Stats::default(), |mut stats, dept| {
            stats.total += 1;
            if dept.is_active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            stats.total_users += u64::from(dept.user_count);
            stats.max_level = stats.max_level.max(dept.level);
            if dept.has_manager() {
                stats.with_managers += 1;
            }
            stats
        })
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total:         {}", self.total)?;
        writeln!(f, "active:        {}", self.active)?;
        writeln!(f, "inactive:      {}", self.inactive)?;
        writeln!(f, "users:         {}", self.total_users)?;
        writeln!(f, "max level:     {}", self.max_level)?;
        write!(f, "with managers: {}", self.with_managers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build_forest;
    use crate::domain::flatten::flatten_refs;

    #[test]
    fn given_empty_input_then_all_zero() {
        assert_eq!(compute_stats(&Vec::<Department>::new()), Stats::default());
    }

    #[test]
    fn given_flattened_forest_then_counts_are_reduced() {
        let forest = build_forest(&[
            Department::new("1", "Root").with_users(3).with_manager("u1", "Ann"),
            Department::new("2", "A").with_parent("1").with_users(5),
            Department::new("3", "A1").with_parent("2").inactive(),
        ]);
        let stats = compute_stats(flatten_refs(&forest));
        assert_eq!(
            stats,
            Stats {
                total: 3,
                active: 2,
                inactive: 1,
                total_users: 8,
                max_level: 2,
                with_managers: 1,
            }
        );
    }
}
