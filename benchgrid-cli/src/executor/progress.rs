//! Progress Display
//!
//! Live per-trial output while the matrix runs. Lines are grouped under a
//! workload header and a candidate-file header; within one workload every
//! line uses the unit picked for its first trial, so the numbers line up.
//!
//! ```text
//! bench_fill_100 - (suite.toml)
//!   fills.sh
//!      112 usec - fill_loop - (2^11 = 2048 loops)
//!     4.61e+03 usec - fill_seq - (2^6 = 64 loops)
//! ```

use benchgrid_core::{Catalog, EntryId, Trial, natural_sorted};
use benchgrid_report::{best_units, format_significant};
use indicatif::{ProgressBar, ProgressStyle};

/// List a catalog as an indented file/name tree.
pub fn format_catalog(title: &str, catalog: &Catalog) -> String {
    let mut output = String::new();
    let plural = if catalog.len() > 1 { "s" } else { "" };
    output.push_str(&format!("Using {} file{}:\n", title, plural));
    for file in natural_sorted(catalog.keys()) {
        output.push_str(&format!("    {}\n", file));
        for name in natural_sorted(&catalog[file]) {
            output.push_str(&format!("        - {}\n", name));
        }
    }
    output
}

/// Trial observer that prints one line per measured cell
pub struct ProgressPrinter {
    bar: ProgressBar,
    workload: Option<EntryId>,
    candidate_file: Option<String>,
    units: Option<(f64, String)>,
}

impl ProgressPrinter {
    /// Printer with a progress bar over `total` cells
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self::with_bar(bar)
    }

    /// Printer that writes lines but draws no bar
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            workload: None,
            candidate_file: None,
            units: None,
        }
    }

    /// Print the discovered files and names before the run
    pub fn announce(&self, candidates: &Catalog, workloads: &Catalog) {
        let text = format!(
            "{}\n{}",
            format_catalog("candidate", candidates),
            format_catalog("workload", workloads)
        );
        self.bar.suspend(|| eprint!("{}", text));
    }

    /// Print the lines for one measured trial and advance the bar
    pub fn observe(&mut self, trial: &Trial) {
        let lines = self.trial_lines(trial);
        self.bar.suspend(|| {
            for line in &lines {
                eprintln!("{}", line);
            }
        });
        self.bar.set_message(trial.candidate.name.clone());
        self.bar.inc(1);
    }

    /// Lines for `trial`, including any new group headers
    pub fn trial_lines(&mut self, trial: &Trial) -> Vec<String> {
        let mut lines = Vec::new();
        let Some(measurement) = trial.measurement() else {
            return lines;
        };

        if self.workload.as_ref() != Some(&trial.workload) {
            self.workload = Some(trial.workload.clone());
            self.candidate_file = None;
            self.units = None;
            lines.push(String::new());
            lines.push(format!("{} - ({})", trial.workload.name, trial.workload.file));
        }

        if self.candidate_file.as_deref() != Some(trial.candidate.file.as_str()) {
            self.candidate_file = Some(trial.candidate.file.clone());
            lines.push(format!("  {}", trial.candidate.file));
        }

        let (scale, units) = self.units.get_or_insert_with(|| {
            let (scale, prefix) = best_units(measurement.min_time);
            (scale, format!("{}sec", prefix))
        });

        let loops = measurement.loops.max(1);
        let twopow = 63 - loops.leading_zeros();
        let mut line = format!(
            "    {:>4} {} - {} - (2^{} = {} loops)",
            format_significant(measurement.min_time * *scale, 3),
            units,
            trial.candidate.name,
            twopow,
            loops
        );
        if measurement.degenerate {
            line.push_str(" [low confidence]");
        }
        lines.push(line);
        lines
    }

    /// Clear the bar once the run is over
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
