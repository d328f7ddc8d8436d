//! Sampling failure logs for manual categorization
//!
//! Building the category table means reading a few logs of each error type.
//! The per-build report written by `classify` says where those logs are.

use super::failure_log_path;
use crate::error::{MatrixError, MatrixResult};
use crate::tabular;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Logs sampled per error type unless asked otherwise
pub const SAMPLE_SIZE: usize = 3;

/// One failed build listed in the error type report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBuild {
    pub name: String,
    pub jdk: u8,
}

/// Failed builds of an error type report, grouped by error type
#[derive(Debug, Default)]
pub struct ErrorTypeIndex {
    path: PathBuf,
    by_type: HashMap<String, Vec<FailedBuild>>,
}

impl ErrorTypeIndex {
    /// Read a report with `name`, `jdk` and `type` columns
    pub async fn load(path: &Path) -> MatrixResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MatrixError::io(format!("reading error types {}", path.display()), e))?;

        let row_error = |line: usize, reason: String| MatrixError::ErrorTypesRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut records = tabular::records(&content);
        let (_, columns) = records
            .next()
            .ok_or_else(|| row_error(1, "missing header".to_string()))?;
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| row_error(1, format!("missing column {}", name)))
        };
        let name_col = column("name")?;
        let jdk_col = column("jdk")?;
        let type_col = column("type")?;

        let mut by_type: HashMap<String, Vec<FailedBuild>> = HashMap::new();
        for (line, fields) in records {
            let (Some(name), Some(jdk), Some(error_type)) =
                (fields.get(name_col), fields.get(jdk_col), fields.get(type_col))
            else {
                return Err(row_error(line, format!("expected {} fields", columns.len())));
            };
            let jdk = jdk
                .parse::<u8>()
                .map_err(|_| row_error(line, format!("invalid JDK version {}", jdk)))?;
            by_type.entry(error_type.clone()).or_default().push(FailedBuild {
                name: name.clone(),
                jdk,
            });
        }

        debug!("Indexed {} error types from {}", by_type.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            by_type,
        })
    }

    /// Failed builds of one error type
    pub fn failures(&self, error_type: &str) -> MatrixResult<&[FailedBuild]> {
        self.by_type
            .get(error_type)
            .map(Vec::as_slice)
            .ok_or_else(|| MatrixError::UnknownErrorType {
                error_type: error_type.to_string(),
                path: self.path.clone(),
            })
    }
}

/// Up to `count` randomly chosen failure logs of `failures`
pub fn sample_logs<R: Rng + ?Sized>(
    failures: &[FailedBuild],
    log_dir: &Path,
    count: usize,
    rng: &mut R,
) -> Vec<PathBuf> {
    failures
        .choose_multiple(rng, count)
        .map(|failure| failure_log_path(log_dir, &failure.name, failure.jdk))
        .collect()
}
