//! Suite Files
//!
//! A suite is a TOML file listing candidates and workloads as shell snippets.
//! It serves both as discovery (which names live in which file) and as the
//! snippet provider for the runner.
//!
//! ```toml
//! base_name = "fill"
//!
//! [[candidate]]
//! file = "fills.sh"
//! name = "fill_loop"
//! setup = "fill() { i=0; while [ $i -lt $1 ]; do i=$((i+1)); done; }"
//!
//! [[workload]]
//! name = "bench_fill_10"
//! run = "fill 10"
//! ```
//!
//! `file` groups entries into tables and defaults to the suite's own path.

use benchgrid_core::{Catalog, EntryId, EntryKind, Snippet, SnippetError, SnippetProvider};
use fxhash::FxHashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a suite file
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SuiteError {
    /// The file could not be read.
    #[error("failed to read suite {path}: {source}")]
    Io {
        /// Suite path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid suite.
    #[error("failed to parse suite {origin}: {source}")]
    Parse {
        /// Suite path or label
        origin: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// The same (file, name) appears twice on one side.
    #[error("duplicate {kind} {id}")]
    Duplicate {
        /// Side of the matrix
        kind: EntryKind,
        /// Repeated identity
        id: EntryId,
    },

    /// An entry has an empty name.
    #[error("{kind} entry in {file} has an empty name")]
    EmptyName {
        /// Side of the matrix
        kind: EntryKind,
        /// Location of the entry
        file: String,
    },

    /// A workload has nothing to run.
    #[error("workload {0} has an empty `run` snippet")]
    EmptyRun(EntryId),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    #[serde(default)]
    base_name: Option<String>,
    #[serde(default, rename = "candidate")]
    candidates: Vec<CandidateDef>,
    #[serde(default, rename = "workload")]
    workloads: Vec<WorkloadDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidateDef {
    #[serde(default)]
    file: Option<String>,
    name: String,
    #[serde(default)]
    setup: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadDef {
    #[serde(default)]
    file: Option<String>,
    name: String,
    #[serde(default)]
    setup: String,
    run: String,
}

/// Loaded suite: discovery catalogs plus snippets
#[derive(Debug, Clone)]
pub struct Suite {
    origin: String,
    base_name: Option<String>,
    candidates: FxHashMap<EntryId, Snippet>,
    workloads: FxHashMap<EntryId, Snippet>,
}

impl Suite {
    /// Load a suite from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SuiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse suite text; `origin` is the default `file` for entries
    pub fn parse(content: &str, origin: &str) -> Result<Self, SuiteError> {
        let raw: SuiteFile = toml::from_str(content).map_err(|source| SuiteError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let mut suite = Suite {
            origin: origin.to_string(),
            base_name: raw.base_name.filter(|b| !b.is_empty()),
            candidates: FxHashMap::default(),
            workloads: FxHashMap::default(),
        };

        for def in raw.candidates {
            let id = suite.entry_id(EntryKind::Candidate, def.file, def.name)?;
            let snippet = Snippet {
                setup: def.setup,
                run: String::new(),
            };
            insert_unique(&mut suite.candidates, EntryKind::Candidate, id, snippet)?;
        }

        for def in raw.workloads {
            let id = suite.entry_id(EntryKind::Workload, def.file, def.name)?;
            if def.run.trim().is_empty() {
                return Err(SuiteError::EmptyRun(id));
            }
            let snippet = Snippet {
                setup: def.setup,
                run: def.run,
            };
            insert_unique(&mut suite.workloads, EntryKind::Workload, id, snippet)?;
        }

        Ok(suite)
    }

    fn entry_id(
        &self,
        kind: EntryKind,
        file: Option<String>,
        name: String,
    ) -> Result<EntryId, SuiteError> {
        let file = file.unwrap_or_else(|| self.origin.clone());
        if name.trim().is_empty() {
            return Err(SuiteError::EmptyName { kind, file });
        }
        Ok(EntryId::new(file, name))
    }

    /// Path or label the suite was loaded from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Operation name candidates are named after, if declared
    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    /// Candidate files and their names
    pub fn candidates(&self) -> Catalog {
        catalog(self.candidates.keys())
    }

    /// Workload files and their names
    pub fn workloads(&self) -> Catalog {
        catalog(self.workloads.keys())
    }
}

fn insert_unique(
    map: &mut FxHashMap<EntryId, Snippet>,
    kind: EntryKind,
    id: EntryId,
    snippet: Snippet,
) -> Result<(), SuiteError> {
    if map.contains_key(&id) {
        return Err(SuiteError::Duplicate { kind, id });
    }
    map.insert(id, snippet);
    Ok(())
}

fn catalog<'a>(ids: impl Iterator<Item = &'a EntryId>) -> Catalog {
    let mut catalog = Catalog::new();
    for id in ids {
        catalog
            .entry(id.file.clone())
            .or_default()
            .insert(id.name.clone());
    }
    catalog
}

impl SnippetProvider for Suite {
    fn snippet(&self, kind: EntryKind, id: &EntryId) -> Result<Snippet, SnippetError> {
        let map = match kind {
            EntryKind::Candidate => &self.candidates,
            EntryKind::Workload => &self.workloads,
        };
        map.get(id).cloned().ok_or_else(|| SnippetError::Unknown {
            kind,
            id: id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
        base_name = "fill"

        [[candidate]]
        file = "fills.sh"
        name = "fill_loop"
        setup = "fill() { :; }"

        [[candidate]]
        file = "fills.sh"
        name = "fill_seq"

        [[workload]]
        name = "bench_fill_10"
        setup = "n=10"
        run = "fill $n"

        [[workload]]
        name = "bench_fill_2"
        run = "fill 2"
    "#;

    #[test]
    fn test_catalogs() {
        let suite = Suite::parse(SUITE, "suite.toml").unwrap();
        assert_eq!(suite.base_name(), Some("fill"));

        let candidates = suite.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates["fills.sh"].len(), 2);

        let workloads = suite.workloads();
        assert_eq!(workloads.keys().collect::<Vec<_>>(), vec!["suite.toml"]);
        assert!(workloads["suite.toml"].contains("bench_fill_2"));
    }

    #[test]
    fn test_snippets() {
        let suite = Suite::parse(SUITE, "suite.toml").unwrap();

        let w = suite
            .snippet(EntryKind::Workload, &EntryId::new("suite.toml", "bench_fill_10"))
            .unwrap();
        assert_eq!(w.setup, "n=10");
        assert_eq!(w.run, "fill $n");

        let c = suite
            .snippet(EntryKind::Candidate, &EntryId::new("fills.sh", "fill_seq"))
            .unwrap();
        assert_eq!(c.setup, "");

        let missing = suite.snippet(EntryKind::Candidate, &EntryId::new("fills.sh", "nope"));
        assert!(matches!(missing, Err(SnippetError::Unknown { .. })));

        // Sides are separate namespaces
        let wrong_side = suite.snippet(EntryKind::Workload, &EntryId::new("fills.sh", "fill_seq"));
        assert!(wrong_side.is_err());
    }

    #[test]
    fn test_duplicate_rejected() {
        let text = r#"
            [[candidate]]
            name = "a"
            [[candidate]]
            name = "a"
        "#;
        let err = Suite::parse(text, "s.toml").unwrap_err();
        assert!(matches!(
            err,
            SuiteError::Duplicate {
                kind: EntryKind::Candidate,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_entries() {
        let empty_name = "[[candidate]]\nname = \" \"\n";
        assert!(matches!(
            Suite::parse(empty_name, "s"),
            Err(SuiteError::EmptyName { .. })
        ));

        let empty_run = "[[workload]]\nname = \"w\"\nrun = \"\"\n";
        assert!(matches!(
            Suite::parse(empty_run, "s"),
            Err(SuiteError::EmptyRun(_))
        ));

        let unknown_key = "[[workload]]\nname = \"w\"\nrun = \"x\"\ncmd = \"y\"\n";
        assert!(matches!(
            Suite::parse(unknown_key, "s"),
            Err(SuiteError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Suite::load("/nonexistent/benchgrid/suite.toml").unwrap_err();
        assert!(matches!(err, SuiteError::Io { .. }));
    }
}
