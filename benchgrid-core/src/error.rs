//! Configuration Errors
//!
//! Errors in the orchestration contract itself. These are always fatal and
//! are returned before any measurement happens.

use std::time::Duration;
use thiserror::Error;

/// Invalid measurement or rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Relative-time and rank views were requested for the same render.
    #[error("'relative' and 'rank' views can't both be requested")]
    ConflictingViews,

    /// The minimum measurement time must be strictly positive.
    #[error("mintime must be positive, got {0:?}")]
    NonPositiveMintime(Duration),

    /// At least one timing repetition is required.
    #[error("numrepeat must be at least 1")]
    ZeroRepeat,
}
