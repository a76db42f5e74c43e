//! Matrix Planner
//!
//! Orders discovered entries and assigns their indices.
//!
//! Ordering: files in natural order, then names in natural order within each
//! file. Each name's index is its zero-based position within its own file, so
//! `bench_2` gets index 0 and `bench_10` index 1 no matter how discovery
//! listed them.
//!
//! Filtering options (applied per trial, after indices are fixed):
//! - Regex pattern matching on candidate name
//! - Regex pattern matching on workload name

use benchgrid_core::{Catalog, EntryId, Trial, natural_cmp};
use regex::Regex;

/// An entry with its index inside its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Entry identity
    pub id: EntryId,
    /// Zero-based natural-order position within `id.file`
    pub index: usize,
}

/// Deterministic iteration order for the whole matrix
#[derive(Debug, Clone, Default)]
pub struct MatrixPlan {
    /// Rows, in the outer-loop order
    pub workloads: Vec<PlannedEntry>,
    /// Columns, in the inner-loop order
    pub candidates: Vec<PlannedEntry>,
}

impl MatrixPlan {
    /// Number of cells in the matrix
    pub fn len(&self) -> usize {
        self.workloads.len() * self.candidates.len()
    }

    /// Whether the matrix has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells `filter` lets through
    pub fn count_accepted(&self, filter: &mut impl FnMut(&Trial) -> bool) -> usize {
        self.workloads
            .iter()
            .flat_map(|w| self.candidates.iter().map(move |c| (w, c)))
            .filter(|(w, c)| filter(&pending_trial(w, c)))
            .count()
    }
}

/// Unmeasured trial carrying only identities and indices
pub fn pending_trial(workload: &PlannedEntry, candidate: &PlannedEntry) -> Trial {
    Trial::new(
        workload.id.clone(),
        workload.index,
        candidate.id.clone(),
        candidate.index,
        String::new(),
        String::new(),
    )
}

/// Order a catalog and index each name within its file.
pub fn order_entries(catalog: &Catalog) -> Vec<PlannedEntry> {
    let mut files: Vec<&String> = catalog.keys().collect();
    files.sort_by(|a, b| natural_cmp(a, b));

    let mut entries = Vec::new();
    for file in files {
        let mut names: Vec<&String> = catalog[file].iter().collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        entries.extend(names.into_iter().enumerate().map(|(index, name)| PlannedEntry {
            id: EntryId::new(file.as_str(), name.as_str()),
            index,
        }));
    }
    entries
}

/// Build the iteration plan from discovered candidates and workloads
pub fn build_plan(candidates: &Catalog, workloads: &Catalog) -> MatrixPlan {
    MatrixPlan {
        workloads: order_entries(workloads),
        candidates: order_entries(candidates),
    }
}

/// Build a trial filter from optional name patterns.
///
/// A trial passes when every given pattern matches its side's name.
pub fn build_trial_filter(
    candidate: Option<Regex>,
    workload: Option<Regex>,
) -> impl FnMut(&Trial) -> bool {
    move |trial: &Trial| {
        // Apply regex filter on candidate name
        if let Some(re) = &candidate {
            if !re.is_match(&trial.candidate.name) {
                return false;
            }
        }

        // Apply regex filter on workload name
        if let Some(re) = &workload {
            if !re.is_match(&trial.workload.name) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: Vec<(&str, Vec<&str>)>) -> Catalog {
        entries
            .into_iter()
            .map(|(file, names)| {
                (
                    file.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    fn trial(workload: &str, candidate: &str) -> Trial {
        Trial::new(
            EntryId::new("w", workload),
            0,
            EntryId::new("c", candidate),
            0,
            String::new(),
            String::new(),
        )
    }

    #[test]
    fn test_natural_order_and_indices() {
        let plan = order_entries(&catalog(vec![("f", vec!["bench_10", "bench_2", "bench_1"])]));
        let names: Vec<_> = plan.iter().map(|e| e.id.name.as_str()).collect();
        assert_eq!(names, vec!["bench_1", "bench_2", "bench_10"]);
        let indices: Vec<_> = plan.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_indices_restart_per_file() {
        let plan = order_entries(&catalog(vec![
            ("file10", vec!["a"]),
            ("file2", vec!["b", "a"]),
        ]));
        let got: Vec<_> = plan
            .iter()
            .map(|e| (e.id.file.as_str(), e.id.name.as_str(), e.index))
            .collect();
        assert_eq!(
            got,
            vec![("file2", "a", 0), ("file2", "b", 1), ("file10", "a", 0)]
        );
    }

    #[test]
    fn test_plan_size() {
        let plan = build_plan(
            &catalog(vec![("c", vec!["x", "y", "z"])]),
            &catalog(vec![("w", vec!["one", "two"])]),
        );
        assert_eq!(plan.len(), 6);
        assert!(!plan.is_empty());
        assert!(build_plan(&Catalog::new(), &catalog(vec![("w", vec!["one"])])).is_empty());
    }

    #[test]
    fn test_no_filter() {
        let mut filter = build_trial_filter(None, None);
        assert!(filter(&trial("bench_a", "fill_loop")));
    }

    #[test]
    fn test_candidate_and_workload_filter() {
        let mut filter = build_trial_filter(
            Some(Regex::new("loop$").unwrap()),
            Some(Regex::new("^bench_1").unwrap()),
        );
        assert!(filter(&trial("bench_10", "fill_loop")));
        assert!(!filter(&trial("bench_10", "fill_seq")));
        assert!(!filter(&trial("bench_2", "fill_loop")));
    }

    #[test]
    fn test_count_accepted() {
        let plan = build_plan(
            &catalog(vec![("c", vec!["fill_loop", "fill_seq", "fill_printf"])]),
            &catalog(vec![("w", vec!["bench_10", "bench_2"])]),
        );
        let mut all = build_trial_filter(None, None);
        assert_eq!(plan.count_accepted(&mut all), 6);

        let mut loops_only = build_trial_filter(Some(Regex::new("loop$").unwrap()), None);
        assert_eq!(plan.count_accepted(&mut loops_only), 2);

        let pending = pending_trial(&plan.workloads[1], &plan.candidates[0]);
        assert_eq!(pending.workload.name, "bench_10");
        assert_eq!(pending.workload_index, 1);
        assert!(!pending.is_measured());
    }
}
