//! Output Formatting
//!
//! Human-readable summary of a finished run: for every group the time,
//! relative and rank tables, followed by any failed cells.

use super::execution::RunOutcome;
use benchgrid_report::{Table, View, render_markdown};

/// Format every table in all three views for terminal display
pub fn format_summary<'a, I>(tables: I, outcome: &RunOutcome) -> String
where
    I: IntoIterator<Item = &'a Table>,
{
    let mut output = String::new();

    output.push('\n');
    output.push_str("Benchgrid Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for table in tables {
        output.push_str(&format!(
            "Workloads: {}\nCandidates: {}\n",
            table.workload_file, table.candidate_file
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for (title, view) in [
            ("Time", View::Time),
            ("Relative time", View::Relative),
            ("Rank", View::Rank),
        ] {
            output.push_str(&format!("\n{}:\n\n", title));
            output.push_str(&render_markdown(table, view));
            output.push('\n');
        }
        output.push('\n');
    }

    let degenerate = outcome
        .trials
        .iter()
        .filter(|t| t.measurement().is_some_and(|m| m.degenerate))
        .count();
    if degenerate > 0 {
        output.push_str(&format!(
            "{} trial(s) never exceeded mintime; their times are low-confidence\n",
            degenerate
        ));
    }

    if !outcome.failures.is_empty() {
        output.push_str(&format!("Failed cells ({}):\n", outcome.failures.len()));
        for failure in &outcome.failures {
            output.push_str(&format!("  ✗ {}\n", failure));
        }
    }

    if outcome.cancelled {
        output.push_str(&format!(
            "Run stopped early after {} trial(s)\n",
            outcome.trials.len()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CellFailure;
    use benchgrid_core::{EntryId, Measurement, Trial};
    use benchgrid_report::aggregate;

    fn outcome() -> RunOutcome {
        let mut trials = Vec::new();
        for (i, (name, t)) in [("fast", 1e-3), ("slow", 3e-3)].into_iter().enumerate() {
            let mut trial = Trial::new(
                EntryId::new("suite.toml", "bench_one"),
                0,
                EntryId::new("impls.sh", name),
                i,
                String::new(),
                String::new(),
            );
            trial
                .record(Measurement::new(128, vec![t], false))
                .unwrap();
            trials.push(trial);
        }
        RunOutcome {
            trials,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    #[test]
    fn test_summary_has_all_views() {
        let outcome = outcome();
        let tables = aggregate(&outcome.trials);
        let text = format_summary(tables.values(), &outcome);

        assert!(text.contains("Benchgrid Results"));
        assert!(text.contains("Workloads: suite.toml"));
        assert!(text.contains("Candidates: impls.sh"));
        assert!(text.contains("Time:"));
        assert!(text.contains("Relative time:"));
        assert!(text.contains("Rank:"));
        assert!(text.contains("(`ms`)"));
        assert!(!text.contains("Failed cells"));
        assert!(!text.contains("stopped early"));
    }

    #[test]
    fn test_summary_reports_failures_and_cancel() {
        let mut outcome = outcome();
        outcome.cancelled = true;
        outcome.failures.push(CellFailure {
            workload: EntryId::new("suite.toml", "bench_two"),
            candidate: EntryId::new("impls.sh", "broken"),
            error: "snippet failed: exit status 1".into(),
        });

        let text = format_summary(std::iter::empty(), &outcome);
        assert!(text.contains("Failed cells (1):"));
        assert!(text.contains("suite.toml::bench_two x impls.sh::broken"));
        assert!(text.contains("Run stopped early after 2 trial(s)"));
    }
}
