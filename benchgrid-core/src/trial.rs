//! Trial Records
//!
//! A `Trial` is one cell of the candidate x workload matrix. It is built with
//! its measurement unset, handed to the caller's filter, measured, and then
//! handed to the caller's observer. The measurement is written exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a candidate or workload: where it came from and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId {
    /// Source location (typically a file path)
    pub file: String,
    /// Name within the source location
    pub name: String,
}

impl EntryId {
    /// Create an identity from a location and a name
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.file, self.name)
    }
}

/// Timing samples for one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Iteration count used for every repetition
    pub loops: u64,
    /// Per-iteration seconds, one entry per repetition
    pub times: Vec<f64>,
    /// Smallest entry of `times`
    pub min_time: f64,
    /// Probing never exceeded `mintime`; precision may be reduced
    pub degenerate: bool,
}

impl Measurement {
    /// Build a measurement, computing `min_time` from `times`.
    pub fn new(loops: u64, times: Vec<f64>, degenerate: bool) -> Self {
        let min_time = times.iter().copied().fold(f64::INFINITY, f64::min);
        let min_time = if min_time.is_finite() { min_time } else { 0.0 };
        Self {
            loops,
            times,
            min_time,
            degenerate,
        }
    }
}

/// Errors from trial bookkeeping
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrialError {
    /// A second measurement was recorded for the same trial.
    #[error("trial {workload} x {candidate} was already measured")]
    AlreadyMeasured {
        /// Workload of the trial
        workload: EntryId,
        /// Candidate of the trial
        candidate: EntryId,
    },
}

/// One (workload, candidate) cell of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Workload identity
    pub workload: EntryId,
    /// Row id of the workload within its file
    pub workload_index: usize,
    /// Candidate identity
    pub candidate: EntryId,
    /// Column id of the candidate within its file
    pub candidate_index: usize,
    /// Part of the candidate name before the base name
    pub candidate_prefix: String,
    /// Part of the candidate name after the base name
    pub candidate_suffix: String,
    /// Workload setup followed by candidate setup
    pub setup: String,
    /// Executable snippet whose time is measured
    pub snippet: String,
    measurement: Option<Measurement>,
}

impl Trial {
    /// Create an unmeasured trial.
    ///
    /// `setup` must already be the combined workload + candidate setup.
    pub fn new(
        workload: EntryId,
        workload_index: usize,
        candidate: EntryId,
        candidate_index: usize,
        setup: String,
        snippet: String,
    ) -> Self {
        let candidate_suffix = candidate.name.clone();
        Self {
            workload,
            workload_index,
            candidate,
            candidate_index,
            candidate_prefix: String::new(),
            candidate_suffix,
            setup,
            snippet,
            measurement: None,
        }
    }

    /// Split the candidate name around `base` (first occurrence).
    ///
    /// `trial_zeros_fast` with base `zeros` gives prefix `trial_` and
    /// suffix `_fast`. Names without `base` keep an empty prefix.
    pub fn with_base_name(mut self, base: &str) -> Self {
        if base.is_empty() {
            return self;
        }
        if let Some((prefix, suffix)) = self.candidate.name.split_once(base) {
            self.candidate_prefix = prefix.to_string();
            self.candidate_suffix = suffix.to_string();
        }
        self
    }

    /// Record the measurement. Fails if one was already recorded.
    pub fn record(&mut self, measurement: Measurement) -> Result<(), TrialError> {
        if self.measurement.is_some() {
            return Err(TrialError::AlreadyMeasured {
                workload: self.workload.clone(),
                candidate: self.candidate.clone(),
            });
        }
        self.measurement = Some(measurement);
        Ok(())
    }

    /// Whether the measurement fields are set
    pub fn is_measured(&self) -> bool {
        self.measurement.is_some()
    }

    /// The measurement, if taken
    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// Loop count, if measured
    pub fn loops(&self) -> Option<u64> {
        self.measurement.as_ref().map(|m| m.loops)
    }

    /// Per-iteration times, if measured
    pub fn times(&self) -> Option<&[f64]> {
        self.measurement.as_ref().map(|m| m.times.as_slice())
    }

    /// Minimum per-iteration time, if measured
    pub fn min_time(&self) -> Option<f64> {
        self.measurement.as_ref().map(|m| m.min_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(name: &str) -> Trial {
        Trial::new(
            EntryId::new("bench_zeros", "bench_small"),
            0,
            EntryId::new("arena_zeros", name),
            1,
            "setup".to_string(),
            "zeros(10)".to_string(),
        )
    }

    #[test]
    fn test_new_trial_is_unmeasured() {
        let t = trial("zeros_mul");
        assert!(!t.is_measured());
        assert_eq!(t.loops(), None);
        assert_eq!(t.times(), None);
        assert_eq!(t.min_time(), None);
    }

    #[test]
    fn test_record_once() {
        let mut t = trial("zeros_mul");
        t.record(Measurement::new(8, vec![3.0, 1.0, 2.0], false))
            .unwrap();

        assert_eq!(t.loops(), Some(8));
        assert_eq!(t.min_time(), Some(1.0));
        assert_eq!(t.times().unwrap().len(), 3);

        let again = t.record(Measurement::new(16, vec![1.0], false));
        assert!(matches!(again, Err(TrialError::AlreadyMeasured { .. })));
        // First measurement is untouched
        assert_eq!(t.loops(), Some(8));
    }

    #[test]
    fn test_base_name_split() {
        let t = trial("trial_zeros_fast").with_base_name("zeros");
        assert_eq!(t.candidate_prefix, "trial_");
        assert_eq!(t.candidate_suffix, "_fast");

        let t = trial("other").with_base_name("zeros");
        assert_eq!(t.candidate_prefix, "");
        assert_eq!(t.candidate_suffix, "other");
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(EntryId::new("a.sh", "f").to_string(), "a.sh::f");
    }
}
