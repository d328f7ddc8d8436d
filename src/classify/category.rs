//! Failure categories
//!
//! Error types are fine-grained and tool-specific; an operator-maintained
//! table maps the frequent ones to a handful of categories for reporting.

use super::ErrorRecord;
use crate::error::{MatrixError, MatrixResult};
use crate::tabular;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Category of every error type missing from the table
pub const UNKNOWN_CATEGORY: &str = "other/unknown";

/// Preferred column order of the well-known categories
pub const CATEGORY_ORDER: [&str; 8] = [
    "initialization",
    "dependency resolution",
    "resource processing",
    "compilation",
    "documentation",
    "extra plugins",
    "packaging",
    "timeout",
];

/// Label of the row aggregating all JDK versions
pub const TOTAL_LABEL: &str = "Total";

/// Mapping from error type to category
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: HashMap<String, String>,
}

impl CategoryTable {
    /// Mapping used until an operator provides one
    pub fn builtin() -> Self {
        Self::from_pairs([("maven-compiler-plugin", "compilation")])
    }

    /// Build a table from (error type, category) pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            categories: pairs
                .into_iter()
                .map(|(t, c)| (t.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// Load a `type,category` table
    pub async fn load(path: &Path) -> MatrixResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MatrixError::io(format!("reading category table {}", path.display()), e))?;

        let table_error = |line: usize, reason: String| MatrixError::CategoryTable {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut records = tabular::records(&content);
        let (_, columns) = records
            .next()
            .ok_or_else(|| table_error(1, "missing header".to_string()))?;
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| table_error(1, format!("missing column {}", name)))
        };
        let type_col = column("type")?;
        let category_col = column("category")?;

        let mut categories = HashMap::new();
        for (line, fields) in records {
            let (Some(error_type), Some(category)) = (fields.get(type_col), fields.get(category_col))
            else {
                return Err(table_error(line, format!("expected {} fields", columns.len())));
            };
            categories.insert(error_type.clone(), category.clone());
        }

        debug!("Loaded {} categorized error types from {}", categories.len(), path.display());
        Ok(Self { categories })
    }

    /// Load the table at `path` if it exists, else the builtin one
    pub async fn load_or_builtin(path: &Path) -> MatrixResult<Self> {
        if path.is_file() {
            Self::load(path).await
        } else {
            debug!("No category table at {}, using builtin", path.display());
            Ok(Self::builtin())
        }
    }

    /// Category of an error type
    pub fn category(&self, error_type: &str) -> &str {
        self.categories
            .get(error_type)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// Share of each category among failures of one JDK version (or all)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    /// JDK version, or [`TOTAL_LABEL`]
    pub label: String,
    /// Number of failures in the row
    pub failures: usize,
    /// Percentages, in the order of [`Breakdown::categories`]
    pub percentages: Vec<f64>,
}

/// Failure categories per JDK version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub categories: Vec<String>,
    pub rows: Vec<BreakdownRow>,
}

/// Compute per-version category percentages plus a total row
///
/// Every row sums to 100. Only categories with at least one failure appear.
pub fn breakdown(records: &[ErrorRecord]) -> Breakdown {
    let categories = ordered_categories(records.iter().map(|r| r.category.as_str()));

    let mut by_version: BTreeMap<u8, Vec<&str>> = BTreeMap::new();
    for record in records {
        by_version
            .entry(record.jdk)
            .or_default()
            .push(record.category.as_str());
    }

    let mut rows: Vec<BreakdownRow> = by_version
        .iter()
        .map(|(version, found)| row(version.to_string(), found, &categories))
        .collect();

    if !records.is_empty() {
        let all: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        rows.push(row(TOTAL_LABEL.to_string(), &all, &categories));
    }

    Breakdown { categories, rows }
}

fn row(label: String, found: &[&str], categories: &[String]) -> BreakdownRow {
    let total = found.len() as f64;
    let percentages = categories
        .iter()
        .map(|category| {
            let count = found.iter().filter(|c| **c == category.as_str()).count();
            count as f64 / total * 100.0
        })
        .collect();

    BreakdownRow {
        label,
        failures: found.len(),
        percentages,
    }
}

/// Well-known categories first, then the rest by name, unknown last
fn ordered_categories<'a>(present: impl Iterator<Item = &'a str>) -> Vec<String> {
    let present: BTreeSet<&str> = present.collect();

    let known = CATEGORY_ORDER.iter().copied().filter(|c| present.contains(c));
    let others = present
        .iter()
        .copied()
        .filter(|c| !CATEGORY_ORDER.contains(c) && *c != UNKNOWN_CATEGORY);
    let unknown = present.contains(UNKNOWN_CATEGORY).then_some(UNKNOWN_CATEGORY);

    known.chain(others).chain(unknown).map(str::to_string).collect()
}

/// How often an error type occurs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorCount {
    pub error_type: String,
    pub count: usize,
    /// Share of failures covered by this and all more frequent types
    pub cumulative_percent: f64,
}

/// Error types by descending frequency (ties by name)
pub fn error_counts(records: &[ErrorRecord]) -> Vec<ErrorCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.error_type.as_str()).or_default() += 1;
    }

    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let total = records.len() as f64;
    let mut running = 0;
    sorted
        .into_iter()
        .map(|(error_type, count)| {
            running += count;
            ErrorCount {
                error_type: error_type.to_string(),
                count,
                cumulative_percent: running as f64 / total * 100.0,
            }
        })
        .collect()
}
