//! Classification report files and tables

use super::category::{Breakdown, ErrorCount};
use super::ErrorRecord;
use crate::error::{MatrixError, MatrixResult};
use crate::tabular;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Per-build classification output
pub const ERROR_TYPES_FILE: &str = "error-types.csv";
/// Category percentages output
pub const CATEGORIES_FILE: &str = "failure-categories.csv";

/// Everything `classify` reports
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    pub failures: usize,
    pub breakdown: Breakdown,
    pub error_counts: Vec<ErrorCount>,
}

/// Write both report files into `output_dir`, returning their paths
pub async fn write_reports(
    output_dir: &Path,
    records: &[ErrorRecord],
    breakdown: &Breakdown,
) -> MatrixResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| MatrixError::io(format!("creating {}", output_dir.display()), e))?;

    let error_types = output_dir.join(ERROR_TYPES_FILE);
    write(&error_types, &error_types_csv(records)).await?;

    let categories = output_dir.join(CATEGORIES_FILE);
    write(&categories, &breakdown_csv(breakdown)).await?;

    info!("Wrote {} and {}", error_types.display(), categories.display());
    Ok(vec![error_types, categories])
}

async fn write(path: &Path, content: &str) -> MatrixResult<()> {
    fs::write(path, content)
        .await
        .map_err(|e| MatrixError::io(format!("writing {}", path.display()), e))
}

fn error_types_csv(records: &[ErrorRecord]) -> String {
    let mut out = tabular::format_record(&["name", "jdk", "tool", "type", "category"]);
    for record in records {
        out.push_str(&tabular::format_record(&[
            record.name.clone(),
            record.jdk.to_string(),
            record.tool.to_string(),
            record.error_type.clone(),
            record.category.clone(),
        ]));
    }
    out
}

fn breakdown_csv(breakdown: &Breakdown) -> String {
    let header: Vec<&str> = ["jdk", "failures"]
        .into_iter()
        .chain(breakdown.categories.iter().map(String::as_str))
        .collect();
    let mut out = tabular::format_record(&header);

    for row in &breakdown.rows {
        let fields: Vec<String> = [row.label.clone(), row.failures.to_string()]
            .into_iter()
            .chain(row.percentages.iter().map(|p| format!("{:.2}", p)))
            .collect();
        out.push_str(&tabular::format_record(&fields));
    }
    out
}

/// Category percentages as an aligned text table
pub fn render_breakdown(breakdown: &Breakdown) -> String {
    let mut rows = vec![["JDK".to_string(), "Failures".to_string()]
        .into_iter()
        .chain(breakdown.categories.iter().cloned())
        .collect::<Vec<_>>()];
    for row in &breakdown.rows {
        rows.push(
            [row.label.clone(), row.failures.to_string()]
                .into_iter()
                .chain(row.percentages.iter().map(|p| format!("{:.1}%", p)))
                .collect(),
        );
    }
    render_table(&rows)
}

/// Error type frequencies as an aligned text table
pub fn render_error_counts(counts: &[ErrorCount]) -> String {
    let mut rows = vec![vec!["Error type".to_string(), "Count".to_string(), "Cumulative".to_string()]];
    for count in counts {
        rows.push(vec![
            count.error_type.clone(),
            count.count.to_string(),
            format!("{:.1}%", count.cumulative_percent),
        ]);
    }
    render_table(&rows)
}

// First column left-aligned, the rest right-aligned
fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{:<width$}", cell, width = widths[i])
                } else {
                    format!("{:>width$}", cell, width = widths[i])
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}
