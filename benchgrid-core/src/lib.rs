#![warn(missing_docs)]
//! benchgrid Core - Measurement Engine
//!
//! This crate provides the pieces every benchgrid run is built from:
//! - `Trial` records for one (workload, candidate) cell of the matrix
//! - The `Timer` abstraction that actually executes snippets
//! - Adaptive measurement with power-of-two loop scaling
//! - Natural ("human") ordering used for stable row/column indices
//! - The `SnippetProvider` seam to whatever produced the snippets
//! - CPU affinity pinning for quieter measurements

mod error;
mod measure;
mod natord;
mod snippet;
mod timer;
mod trial;

pub use error::ConfigurationError;
pub use measure::{
    DEFAULT_MINTIME, DEFAULT_NUMREPEAT, MAX_PROBE_ROUNDS, MeasureConfig, measure, pin_to_cpu,
};
pub use natord::{natural_cmp, natural_cmp_pair, natural_sorted};
pub use snippet::{Catalog, EntryKind, Snippet, SnippetError, SnippetProvider};
pub use timer::{FnTimer, Timer, TimerError};
pub use trial::{EntryId, Measurement, Trial, TrialError};
