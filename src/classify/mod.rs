//! Failure classification
//!
//! Runs after the matrix, over the ledger and the captured logs:
//!
//! | Step | Module |
//! |------|--------|
//! | log → error type | [`gradle`], [`maven`], [`ant`] |
//! | error type → category | [`category`] |
//! | report files and tables | [`report`] |
//! | log samples per error type | [`inspect`] |

pub mod ant;
pub mod category;
pub mod gradle;
pub mod inspect;
pub mod maven;
pub mod report;

pub use category::{breakdown, error_counts, Breakdown, CategoryTable, ErrorCount};

use crate::config::schema::ClassifyConfig;
use crate::error::{MatrixError, MatrixResult};
use crate::ledger::ResultRow;
use crate::project::{flatten_name, BuildTool};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Dependency or plugin resolution failed
pub const RESOLVE: &str = "Resolve";
/// The build failed before any task or goal ran
pub const INIT: &str = "Init";
/// The log shows a failure the parser does not recognize
pub const OTHER: &str = "Other";
/// The build exceeded its time limit
pub const TIMEOUT: &str = "Timeout";
/// The JVM aborted
pub const CRASH: &str = "Crash";

/// Classification of one failed build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub name: String,
    pub jdk: u8,
    pub tool: BuildTool,
    pub error_type: String,
    pub category: String,
}

/// Error type implied by the exit code alone
pub fn sentinel_type(exit_code: i32, config: &ClassifyConfig) -> Option<&'static str> {
    if exit_code == config.timeout_exit_code {
        Some(TIMEOUT)
    } else if exit_code == config.crash_exit_code {
        Some(CRASH)
    } else {
        None
    }
}

/// Error type of a failed build's log
pub fn classify_log(tool: BuildTool, log: &str) -> String {
    (tool.log_parser())(log)
}

/// Path of the failure log of one project and version
pub fn failure_log_path(log_dir: &Path, name: &str, jdk: u8) -> PathBuf {
    log_dir.join(flatten_name(name)).join(format!("{:02}.fail", jdk))
}

/// Classify every failed build recorded in `rows`
///
/// Records are sorted by project name, then JDK version.
pub async fn classify_failures(
    rows: &[ResultRow],
    log_dir: &Path,
    table: &CategoryTable,
    config: &ClassifyConfig,
) -> MatrixResult<Vec<ErrorRecord>> {
    let mut records = Vec::new();

    for row in rows {
        for (jdk, exit_code) in row.failures() {
            let error_type = match sentinel_type(exit_code, config) {
                Some(sentinel) => sentinel.to_string(),
                None => {
                    let path = failure_log_path(log_dir, &row.name, jdk);
                    let bytes = fs::read(&path).await.map_err(|e| {
                        MatrixError::io(format!("reading build log {}", path.display()), e)
                    })?;
                    classify_log(row.tool, &String::from_utf8_lossy(&bytes))
                }
            };

            debug!("{} on Java {}: {}", row.name, jdk, error_type);
            records.push(ErrorRecord {
                name: row.name.clone(),
                jdk,
                tool: row.tool,
                category: table.category(&error_type).to_string(),
                error_type,
            });
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name).then(a.jdk.cmp(&b.jdk)));
    Ok(records)
}
