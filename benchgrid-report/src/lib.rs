#![warn(missing_docs)]
//! Benchgrid Report - Aggregation and Rendering
//!
//! Turns measured trials into comparison tables and renders them:
//! - Markdown (GitHub-flavored pipe tables)
//! - JSON (machine-readable)

mod json;
mod markdown;
mod table;
mod units;

pub use json::{JsonReport, SCHEMA_VERSION, generate_json_report};
pub use markdown::{View, render_markdown, render_markdown_report};
pub use table::{
    GroupKey, STRING_PRECISION, ShortNames, Table, TableCell, TableRow, aggregate,
    aggregate_with, competition_ranks,
};
pub use units::{best_units, format_significant};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One markdown table per group in the selected view
    #[default]
    Markdown,
    /// JSON with every table
    Json,
    /// Time, relative and rank tables for every group
    Summary,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" | "gfm" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "summary" | "human" | "text" => Ok(OutputFormat::Summary),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
