#![warn(missing_docs)]
//! Benchgrid CLI Library
//!
//! This module provides the command-line front end: it loads a suite file,
//! measures every candidate under every workload with a shell timer, and
//! prints the comparison tables.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = benchgrid_cli::run() {
//!         eprintln!("Error: {:#}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod planner;
mod shell;
mod suite;

pub use config::*;
pub use executor::{
    CellErrorPolicy, CellFailure, MatrixRunner, ProgressPrinter, RunConfig, RunError, RunOutcome,
    TrialHook, format_catalog, format_summary,
};
pub use planner::{
    MatrixPlan, PlannedEntry, build_plan, build_trial_filter, order_entries, pending_trial,
};
pub use shell::ShellTimer;
pub use suite::{Suite, SuiteError};

use anyhow::Context;
use benchgrid_core::{MeasureConfig, Trial, pin_to_cpu};
use benchgrid_report::{
    JsonReport, OutputFormat, ShortNames, View, aggregate_with, generate_json_report,
    render_markdown_report,
};
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Benchgrid CLI arguments
#[derive(Parser, Debug)]
#[command(name = "benchgrid")]
#[command(
    author,
    version,
    about = "benchgrid - time candidate implementations across workloads"
)]
pub struct Cli {
    /// Optional subcommand (List, Run, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suite file listing candidates and workloads
    #[arg(default_value = "suite.toml")]
    pub suite: PathBuf,

    /// Configuration file (default: discover benchgrid.toml upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum runtime of one timing (e.g., "250ms", "1s")
    #[arg(long)]
    pub mintime: Option<String>,

    /// Timings per trial
    #[arg(long, short = 'r')]
    pub numrepeat: Option<usize>,

    /// Output format: markdown, json, summary
    #[arg(long)]
    pub format: Option<String>,

    /// Show times relative to the fastest candidate (markdown)
    #[arg(long)]
    pub relative: bool,

    /// Show ranks instead of times (markdown)
    #[arg(long)]
    pub rank: bool,

    /// Only run candidates whose name matches this regex
    #[arg(long)]
    pub candidate: Option<String>,

    /// Only run workloads whose name matches this regex
    #[arg(long)]
    pub workload: Option<String>,

    /// Stop after this many trials
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Shell used to run snippets
    #[arg(long)]
    pub shell: Option<String>,

    /// Stop at the first failing cell instead of collecting failures
    #[arg(long)]
    pub abort_on_error: bool,

    /// Pin the run to this CPU (Linux only)
    #[arg(long)]
    pub pin_cpu: Option<usize>,

    /// Number of threads for table aggregation
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0")]
    pub threads: usize,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// No per-trial progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the candidates and workloads in the suite
    List,
    /// Measure the matrix (default)
    Run,
    /// Write a default benchgrid.toml to the current directory
    Init,
}

/// Run the Benchgrid CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Benchgrid CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("benchgrid=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("benchgrid=info")
            .with_writer(std::io::stderr)
            .init();
    }

    // Explicit --config wins over a discovered benchgrid.toml
    let config = match &cli.config {
        Some(path) => GridConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GridConfig::discover().unwrap_or_default(),
    };

    match cli.command {
        Some(Commands::List) => list_suite(&cli),
        Some(Commands::Init) => write_default_config(),
        Some(Commands::Run) | None => run_suite(&cli, &config),
    }
}

fn list_suite(cli: &Cli) -> anyhow::Result<()> {
    let suite = Suite::load(&cli.suite)?;
    let candidates = suite.candidates();
    let workloads = suite.workloads();

    println!("Benchgrid Plan: {}", suite.origin());
    print!("{}", format_catalog("candidate", &candidates));
    println!();
    print!("{}", format_catalog("workload", &workloads));

    let plan = build_plan(&candidates, &workloads);
    println!(
        "{} workloads x {} candidates = {} trials",
        plan.workloads.len(),
        plan.candidates.len(),
        plan.len()
    );
    Ok(())
}

fn write_default_config() -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", path.display()));
    }
    std::fs::write(&path, GridConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Build a MeasureConfig by layering: benchgrid.toml defaults → CLI overrides.
fn build_measure_config(cli: &Cli, config: &GridConfig) -> anyhow::Result<MeasureConfig> {
    let mut layered = config.clone();
    if let Some(mintime) = &cli.mintime {
        layered.runner.mintime = mintime.clone();
    }
    if let Some(numrepeat) = cli.numrepeat {
        layered.runner.numrepeat = numrepeat;
    }
    layered.measure_config()
}

fn compile_pattern(pattern: Option<&str>, what: &str) -> anyhow::Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("invalid --{} pattern", what)))
        .transpose()
}

fn run_suite(cli: &Cli, config: &GridConfig) -> anyhow::Result<()> {
    // Reject bad settings before anything is measured
    let measure = build_measure_config(cli, config)?;
    let view = View::from_flags(cli.relative, cli.rank)?;
    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let candidate_re = compile_pattern(cli.candidate.as_deref(), "candidate")?;
    let workload_re = compile_pattern(cli.workload.as_deref(), "workload")?;

    // Configure Rayon thread pool for aggregation
    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    if let Some(cpu) = cli.pin_cpu.or(config.runner.pin_cpu) {
        if let Err(e) = pin_to_cpu(cpu) {
            tracing::warn!("Failed to pin to CPU {}: {}", cpu, e);
        }
    }

    let suite = Suite::load(&cli.suite)?;
    let candidates = suite.candidates();
    let workloads = suite.workloads();
    let plan = build_plan(&candidates, &workloads);
    if plan.is_empty() {
        println!("No trials to run.");
        return Ok(());
    }

    let on_cell_error = if cli.abort_on_error {
        CellErrorPolicy::Abort
    } else {
        config.runner.on_cell_error
    };
    let run_config = RunConfig {
        measure,
        on_cell_error,
        base_name: suite.base_name().map(str::to_string),
    };
    let timer = ShellTimer::new(cli.shell.as_deref().unwrap_or(&config.runner.shell));

    let mut filter = build_trial_filter(candidate_re, workload_re);
    let mut printer = if cli.quiet {
        None
    } else {
        let printer = ProgressPrinter::new(plan.count_accepted(&mut filter) as u64);
        printer.announce(&candidates, &workloads);
        Some(printer)
    };

    let start_time = Instant::now();
    let outcome = {
        let limit = cli.limit;
        let mut completed = 0u64;
        let mut runner = MatrixRunner::new(run_config, timer)
            .with_filter(filter)
            .with_callback(|trial: &Trial| {
                if let Some(p) = printer.as_mut() {
                    p.observe(trial);
                }
                completed += 1;
                limit.is_none_or(|n| completed < n)
            });
        runner.run(&candidates, &workloads, &suite)?
    };
    if let Some(p) = &printer {
        p.finish();
    }
    tracing::info!(
        "Measured {} trials in {:.1}s",
        outcome.trials.len(),
        start_time.elapsed().as_secs_f64()
    );

    let names = ShortNames {
        candidate_prefixes: config.naming.candidate_prefixes.clone(),
        workload_prefixes: config.naming.workload_prefixes.clone(),
    };
    let tables = aggregate_with(&outcome.trials, &names);

    // Generate output
    let output = match format {
        OutputFormat::Markdown => render_markdown_report(tables.values(), view),
        OutputFormat::Summary => format_summary(tables.values(), &outcome),
        OutputFormat::Json => {
            let mut report = JsonReport::new(
                tables.into_values().collect(),
                measure.mintime.as_secs_f64(),
                measure.numrepeat,
            );
            report.failures = outcome.failures.iter().map(|f| f.to_string()).collect();
            generate_json_report(&report)?
        }
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    // Exit with appropriate code
    if !outcome.is_success() {
        eprintln!("\n{} trial(s) failed", outcome.failures.len());
        std::process::exit(1);
    }

    Ok(())
}
