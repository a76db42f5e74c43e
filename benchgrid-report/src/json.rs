//! JSON Output

use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current JSON schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Machine-readable run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Schema version of this document
    pub version: u32,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Mintime used for probing, seconds
    pub mintime: f64,
    /// Timings per trial
    pub numrepeat: usize,
    /// Cells that failed to measure, as `workload x candidate: error`
    pub failures: Vec<String>,
    /// One table per (workload file, candidate file)
    pub tables: Vec<Table>,
}

impl JsonReport {
    /// Build a report stamped with the current time.
    pub fn new(tables: Vec<Table>, mintime: f64, numrepeat: usize) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            mintime,
            numrepeat,
            failures: Vec::new(),
            tables,
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &JsonReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::aggregate;
    use benchgrid_core::{EntryId, Measurement, Trial};

    #[test]
    fn test_json_report_shape() {
        let mut trial = Trial::new(
            EntryId::new("b", "w"),
            0,
            EntryId::new("c", "x"),
            0,
            String::new(),
            String::new(),
        );
        trial
            .record(Measurement::new(2, vec![0.5, 0.25], false))
            .unwrap();
        let tables = aggregate(&[trial]).into_values().collect();

        let report = JsonReport::new(tables, 0.25, 2);
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["generated_at"].is_string());
        let cell = &value["tables"][0]["rows"][0]["cells"][0];
        assert_eq!(cell["candidate_name"], "x");
        assert_eq!(cell["rank"], 1);
        assert_eq!(cell["seconds"], 0.25);
        assert_eq!(value["tables"][0]["rows"][0]["units"], "ms");
    }
}
