//! Matrix Executor
//!
//! Runs the candidate x workload matrix and presents the results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Suite (candidates + workloads)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Measure every cell, run hooks
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  progress   │  Per-trial lines while running
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Summary tables after the run
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - The matrix runner, hooks and failure policy
//! - [`progress`] - Live per-trial output
//! - [`formatting`] - Human-readable summary

mod execution;
mod formatting;
mod progress;

// Re-export public API
pub use execution::{
    CellErrorPolicy, CellFailure, MatrixRunner, RunConfig, RunError, RunOutcome, TrialHook,
};
pub use formatting::format_summary;
pub use progress::{ProgressPrinter, format_catalog};
