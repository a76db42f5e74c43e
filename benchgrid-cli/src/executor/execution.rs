//! Matrix Execution
//!
//! Drives the candidate x workload matrix through the adaptive measurement.
//!
//! ## Data Flow
//!
//! ```text
//! Catalogs (candidates, workloads)
//!        │
//!        ▼
//!   MatrixPlan (natural order + indices)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  MatrixRunner    │  Trial → filter → snippets → measure → record → callback
//! └────────┬─────────┘
//!          │
//!          ▼
//!  RunOutcome (trials, failures, cancelled)
//! ```
//!
//! Measurement is strictly sequential: one cell at a time on the calling
//! thread. The only way to stop early is the callback returning `false`.

use crate::planner::{PlannedEntry, build_plan, pending_trial};
use benchgrid_core::{
    Catalog, ConfigurationError, EntryId, EntryKind, MeasureConfig, Snippet, SnippetError,
    SnippetProvider, Timer, TimerError, Trial, TrialError, measure,
};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Per-trial hook. Filters return `false` to skip a cell; callbacks return
/// `false` to stop the run.
pub type TrialHook<'a> = Box<dyn FnMut(&Trial) -> bool + 'a>;

/// What to do when one cell cannot be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CellErrorPolicy {
    /// Log the failure, record it in the outcome, keep running (default)
    #[default]
    Collect,
    /// Stop the run and return the failure as an error
    Abort,
}

/// Configuration for one matrix run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Probing and repetition settings
    pub measure: MeasureConfig,
    /// Failure handling for individual cells
    pub on_cell_error: CellErrorPolicy,
    /// Operation name used to split candidate names into prefix and suffix
    pub base_name: Option<String>,
}

/// A cell that could not be measured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFailure {
    /// Row of the failed cell
    pub workload: EntryId,
    /// Column of the failed cell
    pub candidate: EntryId,
    /// Rendered cause
    pub error: String,
}

impl std::fmt::Display for CellFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}: {}", self.workload, self.candidate, self.error)
    }
}

/// Result of a matrix run
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Completed trials in execution order
    pub trials: Vec<Trial>,
    /// Cells that failed under [`CellErrorPolicy::Collect`]
    pub failures: Vec<CellFailure>,
    /// The callback stopped the run; `trials` is a prefix of the matrix
    pub cancelled: bool,
}

impl RunOutcome {
    /// Whether every attempted cell was measured
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that end a matrix run
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Settings rejected before anything was measured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The snippet provider failed for a cell (abort policy).
    #[error("{workload} x {candidate}: {source}")]
    Snippet {
        /// Row of the failed cell
        workload: EntryId,
        /// Column of the failed cell
        candidate: EntryId,
        /// Provider error
        #[source]
        source: SnippetError,
    },

    /// The timer failed for a cell (abort policy).
    #[error("{workload} x {candidate}: {source}")]
    Timer {
        /// Row of the failed cell
        workload: EntryId,
        /// Column of the failed cell
        candidate: EntryId,
        /// Timer error
        #[source]
        source: TimerError,
    },

    /// Trial bookkeeping was violated.
    #[error(transparent)]
    Trial(#[from] TrialError),
}

enum CellError {
    Snippet(SnippetError),
    Timer(TimerError),
}

/// Runs every cell of the matrix with an injected timer
pub struct MatrixRunner<'a, T: Timer> {
    config: RunConfig,
    timer: T,
    filter: Option<TrialHook<'a>>,
    callback: Option<TrialHook<'a>>,
}

impl<'a, T: Timer> MatrixRunner<'a, T> {
    /// Create a runner with no hooks
    pub fn new(config: RunConfig, timer: T) -> Self {
        Self {
            config,
            timer,
            filter: None,
            callback: None,
        }
    }

    /// Skip cells for which `filter` returns `false`.
    ///
    /// The filter sees identities, indices and the name split only; snippets
    /// are fetched after it accepts the cell.
    pub fn with_filter(mut self, filter: impl FnMut(&Trial) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Observe each measured trial; returning `false` stops the run
    pub fn with_callback(mut self, callback: impl FnMut(&Trial) -> bool + 'a) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Run the whole matrix.
    ///
    /// Workloads form the outer loop and candidates the inner loop, both in
    /// natural order of (file, name).
    pub fn run(
        &mut self,
        candidates: &Catalog,
        workloads: &Catalog,
        snippets: &dyn SnippetProvider,
    ) -> Result<RunOutcome, RunError> {
        self.config.measure.validate()?;

        let plan = build_plan(candidates, workloads);
        info!(
            workloads = plan.workloads.len(),
            candidates = plan.candidates.len(),
            "Running {} trials",
            plan.len()
        );

        let mut cache: FxHashMap<(EntryKind, EntryId), Result<Snippet, SnippetError>> =
            FxHashMap::default();
        let mut outcome = RunOutcome::default();

        for workload in &plan.workloads {
            for candidate in &plan.candidates {
                let mut trial = pending_trial(workload, candidate);
                if let Some(base) = self.config.base_name.as_deref() {
                    trial = trial.with_base_name(base);
                }

                if let Some(filter) = self.filter.as_mut() {
                    if !filter(&trial) {
                        debug!(workload = %trial.workload, candidate = %trial.candidate, "Skipped by filter");
                        continue;
                    }
                }

                match combined_snippet(workload, candidate, snippets, &mut cache) {
                    Ok((setup, run)) => {
                        trial.setup = setup;
                        trial.snippet = run;
                    }
                    Err(e) => {
                        self.handle_failure(workload, candidate, CellError::Snippet(e), &mut outcome)?;
                        continue;
                    }
                }

                let measurement =
                    match measure(&trial.setup, &trial.snippet, &self.config.measure, &self.timer) {
                        Ok(m) => m,
                        Err(e) => {
                            self.handle_failure(workload, candidate, CellError::Timer(e), &mut outcome)?;
                            continue;
                        }
                    };
                trial.record(measurement)?;

                let keep_going = match self.callback.as_mut() {
                    Some(callback) => callback(&trial),
                    None => true,
                };
                outcome.trials.push(trial);

                if !keep_going {
                    info!(
                        completed = outcome.trials.len(),
                        "Run stopped by callback"
                    );
                    outcome.cancelled = true;
                    return Ok(outcome);
                }
            }
        }

        info!(
            completed = outcome.trials.len(),
            failed = outcome.failures.len(),
            "Run complete"
        );
        Ok(outcome)
    }

    fn handle_failure(
        &self,
        workload: &PlannedEntry,
        candidate: &PlannedEntry,
        cause: CellError,
        outcome: &mut RunOutcome,
    ) -> Result<(), RunError> {
        let message = match &cause {
            CellError::Snippet(e) => e.to_string(),
            CellError::Timer(e) => e.to_string(),
        };
        error!(
            workload = %workload.id,
            candidate = %candidate.id,
            "Trial failed: {}",
            message
        );

        match self.config.on_cell_error {
            CellErrorPolicy::Collect => {
                outcome.failures.push(CellFailure {
                    workload: workload.id.clone(),
                    candidate: candidate.id.clone(),
                    error: message,
                });
                Ok(())
            }
            CellErrorPolicy::Abort => Err(match cause {
                CellError::Snippet(source) => RunError::Snippet {
                    workload: workload.id.clone(),
                    candidate: candidate.id.clone(),
                    source,
                },
                CellError::Timer(source) => RunError::Timer {
                    workload: workload.id.clone(),
                    candidate: candidate.id.clone(),
                    source,
                },
            }),
        }
    }
}

/// Setup and run text for one cell, fetched through the cache
fn combined_snippet(
    workload: &PlannedEntry,
    candidate: &PlannedEntry,
    snippets: &dyn SnippetProvider,
    cache: &mut FxHashMap<(EntryKind, EntryId), Result<Snippet, SnippetError>>,
) -> Result<(String, String), SnippetError> {
    let bench = fetch(cache, snippets, EntryKind::Workload, &workload.id)?;
    let cand = fetch(cache, snippets, EntryKind::Candidate, &candidate.id)?;
    Ok((join_setup(&bench.setup, &cand.setup), bench.run))
}

fn fetch(
    cache: &mut FxHashMap<(EntryKind, EntryId), Result<Snippet, SnippetError>>,
    snippets: &dyn SnippetProvider,
    kind: EntryKind,
    id: &EntryId,
) -> Result<Snippet, SnippetError> {
    cache
        .entry((kind, id.clone()))
        .or_insert_with(|| snippets.snippet(kind, id))
        .clone()
}

/// Workload setup followed by candidate setup
fn join_setup(workload: &str, candidate: &str) -> String {
    match (workload.is_empty(), candidate.is_empty()) {
        (true, _) => candidate.to_string(),
        (_, true) => workload.to_string(),
        _ => format!("{}\n{}", workload, candidate),
    }
}
