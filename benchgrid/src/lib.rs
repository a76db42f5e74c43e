#![warn(missing_docs)]
//! # Benchgrid
//!
//! Compare alternative implementations of an operation across a set of
//! workloads.
//!
//! Benchgrid measures every candidate under every workload and turns the
//! timings into ranked comparison tables:
//! - **Adaptive Timing**: loop counts grow by powers of two until one timing
//!   clears `mintime`, then the minimum of `numrepeat` timings is kept
//! - **Deterministic Matrix**: rows and columns follow natural order
//!   (`bench_2` before `bench_10`), one trial per cell
//! - **Hooks**: a filter can skip cells before they run and a callback can
//!   stop the run after any trial
//! - **Tables**: per-row unit scaling, relative time and competition rank,
//!   rendered as markdown or JSON
//!
//! ## Quick Start
//!
//! ```ignore
//! use benchgrid::{FnTimer, MatrixRunner, RunConfig, aggregate};
//!
//! let timer = FnTimer::new(|setup, snippet, loops| my_timing(setup, snippet, loops));
//! let mut runner = MatrixRunner::new(RunConfig::default(), timer)
//!     .with_callback(|trial| { println!("{}", trial.candidate); true });
//! let outcome = runner.run(&candidates, &workloads, &snippets)?;
//! let tables = aggregate(&outcome.trials);
//! ```

// Re-export core types
pub use benchgrid_core::{
    Catalog, ConfigurationError, DEFAULT_MINTIME, DEFAULT_NUMREPEAT, EntryId, EntryKind,
    FnTimer, MAX_PROBE_ROUNDS, MeasureConfig, Measurement, Snippet, SnippetError,
    SnippetProvider, Timer, TimerError, Trial, TrialError, measure, natural_cmp, natural_sorted,
    pin_to_cpu,
};

// Re-export report types
pub use benchgrid_report::{
    GroupKey, JsonReport, OutputFormat, ShortNames, Table, TableCell, TableRow, View, aggregate,
    aggregate_with, best_units, format_significant, generate_json_report, render_markdown,
    render_markdown_report,
};

// Re-export the orchestrator and CLI
pub use benchgrid_cli::{
    CellErrorPolicy, CellFailure, Cli, GridConfig, MatrixRunner, RunConfig, RunError, RunOutcome,
    ShellTimer, Suite, SuiteError, run,
};
