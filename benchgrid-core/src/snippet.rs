//! Snippet Provider
//!
//! The boundary to whatever discovered the candidates and workloads. The core
//! only asks for opaque text blobs and never looks inside them.

use crate::trial::EntryId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Discovered entries: source location -> names found there.
pub type Catalog = BTreeMap<String, BTreeSet<String>>;

/// Which side of the matrix an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Alternative implementation (a column)
    Candidate,
    /// Scenario being timed (a row)
    Workload,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Candidate => write!(f, "candidate"),
            EntryKind::Workload => write!(f, "workload"),
        }
    }
}

/// Setup and executable text for one entry.
///
/// For candidates, `setup` makes the candidate callable and `run` is unused.
/// For workloads, `run` is the code whose time is measured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    /// Text executed once before timing
    pub setup: String,
    /// Text executed once per loop iteration
    pub run: String,
}

/// Errors from the snippet collaborator
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SnippetError {
    /// No entry with this identity is known.
    #[error("unknown {kind} {id}")]
    Unknown {
        /// Side of the matrix
        kind: EntryKind,
        /// Requested identity
        id: EntryId,
    },

    /// The entry exists but no usable snippet could be produced.
    #[error("could not load {kind} {id}: {reason}")]
    Unusable {
        /// Side of the matrix
        kind: EntryKind,
        /// Requested identity
        id: EntryId,
        /// Human-readable cause
        reason: String,
    },
}

/// Produces snippets for discovered entries.
pub trait SnippetProvider {
    /// Setup/executable text for `id`.
    fn snippet(&self, kind: EntryKind, id: &EntryId) -> Result<Snippet, SnippetError>;
}

impl<P: SnippetProvider + ?Sized> SnippetProvider for &P {
    fn snippet(&self, kind: EntryKind, id: &EntryId) -> Result<Snippet, SnippetError> {
        (**self).snippet(kind, id)
    }
}
