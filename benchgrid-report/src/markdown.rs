//! GitHub-Flavored Markdown Tables
//!
//! Renders one aggregated table as a markdown pipe table. Rows are workloads,
//! columns are candidates. The fastest cell in a row is bold; the runner-up is
//! italic when the row has more than two cells.

use crate::table::{Table, TableCell};
use benchgrid_core::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Which value a table cell displays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Scaled time in the row's unit
    #[default]
    Time,
    /// Time relative to the row's best
    Relative,
    /// Competition rank, 1 is fastest
    Rank,
}

impl View {
    /// Select a view from the `--relative` / `--rank` switches.
    pub fn from_flags(relative: bool, rank: bool) -> Result<Self, ConfigurationError> {
        match (relative, rank) {
            (true, true) => Err(ConfigurationError::ConflictingViews),
            (true, false) => Ok(View::Relative),
            (false, true) => Ok(View::Rank),
            (false, false) => Ok(View::Time),
        }
    }
}

const CORNER_LABEL: &str = "__Workload__ \\ __Candidate__ ";

fn cell_text(cell: &TableCell, view: View) -> String {
    match view {
        View::Time => cell.time_str.clone(),
        View::Relative => cell.relative_str.clone(),
        View::Rank => cell.rank.to_string(),
    }
}

/// Center `s` in `width` columns, putting the odd space where Python's
/// `str.center` does so tables line up with older reports.
fn center(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

fn right_justify(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(len)), s)
}

/// Render `table` as a markdown pipe table.
///
/// Columns are the union of candidates across rows; a row missing a
/// candidate gets a blank cell.
pub fn render_markdown(table: &Table, view: View) -> String {
    let columns = table.columns();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows.len() + 1);
    let mut header = vec![CORNER_LABEL.to_string()];
    header.extend(columns.iter().map(|(_, name)| format!(" __{}__ ", name)));
    grid.push(header);

    for row in &table.rows {
        let label = match view {
            View::Time => format!(" __{}__ (`{}`) ", row.workload_short, row.units),
            View::Relative | View::Rank => format!(" __{}__ ", row.workload_short),
        };
        let mut line = vec![label];
        let emphasize_second = row.cells.len() > 2;

        for (index, _) in &columns {
            let text = match row.cells.iter().find(|c| c.candidate_index == *index) {
                Some(cell) => {
                    let value = cell_text(cell, view);
                    if cell.rank == 1 {
                        format!(" __{}__ ", value)
                    } else if cell.rank == 2 && emphasize_second {
                        format!(" *{}* ", value)
                    } else {
                        format!(" {} ", value)
                    }
                }
                None => " ".to_string(),
            };
            line.push(text);
        }
        grid.push(line);
    }

    let mut widths = vec![0usize; columns.len() + 1];
    for line in &grid {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    for line in &mut grid {
        for (i, cell) in line.iter_mut().enumerate() {
            *cell = if i == 0 {
                right_justify(cell, widths[i])
            } else {
                center(cell, widths[i])
            };
        }
    }

    // Centered columns; the label column is right-aligned
    let mut bar: Vec<String> = widths
        .iter()
        .map(|w| format!(":{}:", "-".repeat(w.saturating_sub(2))))
        .collect();
    bar[0] = format!(" {}:", "-".repeat(widths[0].saturating_sub(2)));
    grid.insert(1, bar);

    grid.iter()
        .map(|line| format!("|{}|", line.join("|")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render every table with a heading naming its file pair.
pub fn render_markdown_report<'a, I>(tables: I, view: View) -> String
where
    I: IntoIterator<Item = &'a Table>,
{
    let mut output = String::new();
    for table in tables {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!(
            "### {} x {}\n\n",
            table.workload_file, table.candidate_file
        ));
        output.push_str(&render_markdown(table, view));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{TableRow, aggregate};
    use benchgrid_core::{EntryId, Measurement, Trial};

    fn measured(workload: (&str, usize), candidate: (&str, usize), min_time: f64) -> Trial {
        let mut t = Trial::new(
            EntryId::new("bench.toml", workload.0),
            workload.1,
            EntryId::new("cands.toml", candidate.0),
            candidate.1,
            String::new(),
            String::new(),
        );
        t.record(Measurement::new(4, vec![min_time], false)).unwrap();
        t
    }

    fn three_way() -> Table {
        let trials = vec![
            measured(("small", 0), ("a", 0), 3e-3),
            measured(("small", 0), ("b", 1), 1e-3),
            measured(("small", 0), ("c", 2), 2e-3),
        ];
        aggregate(&trials).into_values().next().unwrap()
    }

    #[test]
    fn test_view_flags() {
        assert_eq!(View::from_flags(false, false), Ok(View::Time));
        assert_eq!(View::from_flags(true, false), Ok(View::Relative));
        assert_eq!(View::from_flags(false, true), Ok(View::Rank));
        assert_eq!(
            View::from_flags(true, true),
            Err(ConfigurationError::ConflictingViews)
        );
    }

    #[test]
    fn test_center_matches_python() {
        assert_eq!(center("ab", 5), "  ab ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("a", 3), " a ");
        assert_eq!(center("long", 2), "long");
    }

    #[test]
    fn test_time_view() {
        let md = render_markdown(&three_way(), View::Time);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);

        assert!(lines[0].contains("__a__"));
        assert!(lines[0].contains("__c__"));
        assert!(lines[1].starts_with("| ") && lines[1].ends_with(":|"));
        assert!(lines[2].contains("__small__ (`ms`)"));
        // b is fastest, c is runner-up
        assert!(lines[2].contains("__1__"));
        assert!(lines[2].contains("*2*"));
        assert!(lines[2].contains(" 3 "));

        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_rank_and_relative_views() {
        let table = three_way();

        let rank = render_markdown(&table, View::Rank);
        let row = rank.lines().nth(2).unwrap();
        assert!(row.contains("__small__ "));
        assert!(!row.contains("`ms`"));
        assert!(row.contains(" 3 ") && row.contains("__1__") && row.contains("*2*"));

        let relative = render_markdown(&table, View::Relative);
        let row = relative.lines().nth(2).unwrap();
        assert!(row.contains(" 3 ") && row.contains("__1__") && row.contains("*2*"));
    }

    #[test]
    fn test_two_cells_no_italics() {
        let trials = vec![
            measured(("w", 0), ("a", 0), 2.0),
            measured(("w", 0), ("b", 1), 1.0),
        ];
        let table = aggregate(&trials).into_values().next().unwrap();
        let md = render_markdown(&table, View::Rank);
        assert!(!md.contains('*'));
    }

    #[test]
    fn test_missing_cell_is_blank() {
        let mut table = three_way();
        let mut extra: TableRow = table.rows[0].clone();
        extra.workload_index = 1;
        extra.workload_short = "big".into();
        extra.cells.retain(|c| c.candidate_index != 1);
        table.rows.push(extra);

        let md = render_markdown(&table, View::Rank);
        let last = md.lines().last().unwrap();
        assert_eq!(last.matches('|').count(), 5);
    }

    #[test]
    fn test_report_headings() {
        let table = three_way();
        let out = render_markdown_report([&table], View::Time);
        assert!(out.starts_with("### bench.toml x cands.toml\n\n|"));
    }
}
