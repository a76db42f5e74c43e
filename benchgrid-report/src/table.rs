//! Result Aggregation
//!
//! Groups completed trials by (workload file, candidate file) and turns each
//! group into a table: one row per workload, one column per candidate.
//!
//! Per row:
//! - the unit is picked so the row's slowest time renders in `[1, 1000)`
//! - `rank` uses standard competition ranking ("1224"): one plus the number of
//!   strictly faster cells, so ties share a rank and the next rank skips
//! - `relative_time` is the cell time over the row's best time

use crate::units::{best_units, format_significant};
use benchgrid_core::{Trial, natural_cmp_pair};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Significant digits used by the string views
pub const STRING_PRECISION: usize = 3;

/// Identifies one aggregation group.
///
/// Ordered naturally by workload file, then candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Source location of the workloads (rows)
    pub workload_file: String,
    /// Source location of the candidates (columns)
    pub candidate_file: String,
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp_pair(
            (self.workload_file.as_str(), self.candidate_file.as_str()),
            (other.workload_file.as_str(), other.candidate_file.as_str()),
        )
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Prefixes stripped from names to produce short labels.
#[derive(Debug, Clone, Default)]
pub struct ShortNames {
    /// Stripped from candidate names (e.g. `trial_zeros`)
    pub candidate_prefixes: Vec<String>,
    /// Stripped from workload names (e.g. `bench_`)
    pub workload_prefixes: Vec<String>,
}

impl ShortNames {
    /// Candidate label with the longest matching prefix removed
    pub fn candidate<'a>(&self, name: &'a str) -> &'a str {
        strip_longest_prefix(name, &self.candidate_prefixes)
    }

    /// Workload label with the longest matching prefix removed
    pub fn workload<'a>(&self, name: &'a str) -> &'a str {
        strip_longest_prefix(name, &self.workload_prefixes)
    }
}

fn strip_longest_prefix<'a>(name: &'a str, prefixes: &[String]) -> &'a str {
    prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .filter_map(|p| name.strip_prefix(p.as_str()).map(|rest| (p.len(), rest)))
        .max_by_key(|(len, _)| *len)
        .map(|(_, rest)| rest)
        .unwrap_or(name)
}

/// One candidate's result within a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Column id
    pub candidate_index: usize,
    /// Full candidate name
    pub candidate_name: String,
    /// Candidate label with prefixes stripped
    pub candidate_short: String,
    /// Loop count used for the measurement
    pub loops: u64,
    /// Minimum per-iteration time in seconds
    pub seconds: f64,
    /// `seconds` scaled into the row's unit
    pub time: f64,
    /// Whether this cell has the row's best time
    pub is_best: bool,
    /// 1 is fastest; ties share a rank
    pub rank: usize,
    /// `seconds / best seconds`
    pub relative_time: f64,
    /// `time` with three significant digits
    pub time_str: String,
    /// `relative_time` with three significant digits
    pub relative_str: String,
    /// The measurement never cleared `mintime`
    pub degenerate: bool,
}

/// One workload's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row id
    pub workload_index: usize,
    /// Full workload name
    pub workload_name: String,
    /// Workload label with prefixes stripped
    pub workload_short: String,
    /// Multiplier from seconds to `units`
    pub scale: f64,
    /// Time unit for every cell in the row, e.g. `ms`
    pub units: String,
    /// Best (minimum) time in the row, seconds
    pub best_seconds: f64,
    /// Cells ordered by candidate index
    pub cells: Vec<TableCell>,
}

/// Comparison table for one aggregation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Source location of the workloads
    pub workload_file: String,
    /// Source location of the candidates
    pub candidate_file: String,
    /// Rows ordered by workload index
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Every column present in any row: `(candidate index, short label)`.
    pub fn columns(&self) -> Vec<(usize, &str)> {
        let mut columns: BTreeMap<usize, &str> = BTreeMap::new();
        for row in &self.rows {
            for cell in &row.cells {
                columns.entry(cell.candidate_index).or_insert(&cell.candidate_short);
            }
        }
        columns.into_iter().collect()
    }
}

/// Rank each value: one plus the count of strictly smaller values.
pub fn competition_ranks(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|other| *other < v).count())
        .collect()
}

fn relative(seconds: f64, best: f64) -> f64 {
    if best > 0.0 {
        seconds / best
    } else if seconds == best {
        1.0
    } else {
        f64::INFINITY
    }
}

/// Aggregate trials into tables without shortening names.
pub fn aggregate(trials: &[Trial]) -> BTreeMap<GroupKey, Table> {
    aggregate_with(trials, &ShortNames::default())
}

/// Aggregate trials into tables, one per (workload file, candidate file).
///
/// Unmeasured trials are ignored. Groups only exist for trials that exist.
pub fn aggregate_with(trials: &[Trial], names: &ShortNames) -> BTreeMap<GroupKey, Table> {
    let mut groups: BTreeMap<GroupKey, Vec<&Trial>> = BTreeMap::new();
    for trial in trials.iter().filter(|t| t.is_measured()) {
        let key = GroupKey {
            workload_file: trial.workload.file.clone(),
            candidate_file: trial.candidate.file.clone(),
        };
        groups.entry(key).or_default().push(trial);
    }

    groups
        .into_par_iter()
        .map(|(key, trials)| {
            let table = build_table(&key, &trials, names);
            (key, table)
        })
        .collect()
}

fn build_table(key: &GroupKey, trials: &[&Trial], names: &ShortNames) -> Table {
    let mut by_workload: BTreeMap<usize, BTreeMap<usize, &Trial>> = BTreeMap::new();
    for trial in trials {
        by_workload
            .entry(trial.workload_index)
            .or_default()
            .insert(trial.candidate_index, *trial);
    }

    let rows = by_workload
        .into_iter()
        .filter_map(|(workload_index, cells)| build_row(workload_index, &cells, names))
        .collect();

    Table {
        workload_file: key.workload_file.clone(),
        candidate_file: key.candidate_file.clone(),
        rows,
    }
}

fn build_row(
    workload_index: usize,
    cells: &BTreeMap<usize, &Trial>,
    names: &ShortNames,
) -> Option<TableRow> {
    let first = cells.values().next()?;
    let seconds: Vec<f64> = cells
        .values()
        .map(|t| t.min_time().unwrap_or(0.0))
        .collect();

    let best = seconds.iter().copied().fold(f64::INFINITY, f64::min);
    let worst = seconds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (scale, prefix) = best_units(worst);
    let units = format!("{}s", prefix);
    let ranks = competition_ranks(&seconds);

    let cells = cells
        .iter()
        .zip(seconds.iter().zip(ranks))
        .map(|((&candidate_index, trial), (&secs, rank))| {
            let time = secs * scale;
            let relative_time = relative(secs, best);
            TableCell {
                candidate_index,
                candidate_name: trial.candidate.name.clone(),
                candidate_short: names.candidate(&trial.candidate.name).to_string(),
                loops: trial.loops().unwrap_or(0),
                seconds: secs,
                time,
                is_best: secs == best,
                rank,
                relative_time,
                time_str: format_significant(time, STRING_PRECISION),
                relative_str: format_significant(relative_time, STRING_PRECISION),
                degenerate: trial.measurement().is_some_and(|m| m.degenerate),
            }
        })
        .collect();

    Some(TableRow {
        workload_index,
        workload_name: first.workload.name.clone(),
        workload_short: names.workload(&first.workload.name).to_string(),
        scale,
        units,
        best_seconds: best,
        cells,
    })
}
