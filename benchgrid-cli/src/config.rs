//! Configuration loading from benchgrid.toml
//!
//! Benchgrid settings can live in a `benchgrid.toml` file next to the suites.
//! The file is discovered by walking up from the current directory.

use crate::executor::CellErrorPolicy;
use benchgrid_core::{DEFAULT_NUMREPEAT, MeasureConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "benchgrid.toml";

/// Benchgrid configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GridConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Short-label configuration
    #[serde(default)]
    pub naming: NamingConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for measuring the matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Minimum runtime of one timing (e.g., "250ms", "1s")
    #[serde(default = "default_mintime")]
    pub mintime: String,
    /// Timings taken per trial
    #[serde(default = "default_numrepeat")]
    pub numrepeat: usize,
    /// Shell used to run snippets
    #[serde(default = "default_shell")]
    pub shell: String,
    /// What to do when a cell fails: "collect" or "abort"
    #[serde(default)]
    pub on_cell_error: CellErrorPolicy,
    /// Pin the run to this CPU (Linux only)
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mintime: default_mintime(),
            numrepeat: default_numrepeat(),
            shell: default_shell(),
            on_cell_error: CellErrorPolicy::default(),
            pin_cpu: None,
        }
    }
}

fn default_mintime() -> String {
    "250ms".to_string()
}
fn default_numrepeat() -> usize {
    DEFAULT_NUMREPEAT
}
fn default_shell() -> String {
    "sh".to_string()
}

/// Prefixes stripped from names for table labels
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NamingConfig {
    /// Stripped from candidate names
    #[serde(default)]
    pub candidate_prefixes: Vec<String>,
    /// Stripped from workload names
    #[serde(default = "default_workload_prefixes")]
    pub workload_prefixes: Vec<String>,
}

fn default_workload_prefixes() -> Vec<String> {
    vec!["bench_".to_string()]
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "markdown", "json", "summary"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "summary".to_string()
}

impl GridConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Measurement settings from the `[runner]` section
    pub fn measure_config(&self) -> anyhow::Result<MeasureConfig> {
        let mintime = Self::parse_duration(&self.runner.mintime)?;
        Ok(MeasureConfig::new(mintime, self.runner.numrepeat)?)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Benchgrid Configuration

[runner]
# A timing must run at least this long before the loop count is fixed
mintime = "250ms"
# Timings per trial (the minimum is reported)
numrepeat = 3
# Shell used to run snippets
shell = "sh"
# On a failing cell: "collect" keeps going, "abort" stops the run
on_cell_error = "collect"
# Pin the run to one CPU (uncomment to enable, Linux only)
# pin_cpu = 2

[naming]
# Prefixes stripped from names in table labels
candidate_prefixes = []
workload_prefixes = ["bench_"]

[output]
# Default output format: markdown, json, summary
format = "summary"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "250ms", "1.5s", "100us")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: f64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_secs_f64(value * multiplier))
    }
}
