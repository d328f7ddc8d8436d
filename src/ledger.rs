//! Results ledger
//!
//! The ledger is the only record of progress. A project's row is appended
//! after every JDK version was attempted and is flushed to disk before the
//! next project starts, so a row's presence means "complete" and its absence
//! means "redo from scratch".

use crate::error::{MatrixError, MatrixResult};
use crate::project::{BuildTool, Project};
use crate::tabular;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Ledger file name inside the results directory
pub const LEDGER_FILE: &str = "results.csv";

const FIXED_COLUMNS: [&str; 4] = ["name", "commit", "tool", "wrapper"];

/// Outcome of one project across all JDK versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub commit: String,
    pub tool: BuildTool,
    pub wrapper: Option<String>,
    /// Exit code per JDK version
    pub exit_codes: BTreeMap<u8, i32>,
}

impl ResultRow {
    /// Empty row for a detected project
    pub fn for_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            commit: project.commit.clone(),
            tool: project.tool,
            wrapper: project.wrapper.map(str::to_string),
            exit_codes: BTreeMap::new(),
        }
    }

    /// JDK versions whose build failed, with their exit codes
    pub fn failures(&self) -> impl Iterator<Item = (u8, i32)> + '_ {
        self.exit_codes
            .iter()
            .filter(|(_, code)| **code != 0)
            .map(|(version, code)| (*version, *code))
    }
}

/// Durable record of completed projects
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Identities of every project with a row
    async fn load_completed(&self) -> MatrixResult<HashSet<String>>;

    /// Append one row and make it durable
    async fn append(&mut self, row: &ResultRow) -> MatrixResult<()>;
}

/// Column names for a JDK range
pub fn header(versions: RangeInclusive<u8>) -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(versions.map(|v| format!("java{}", v)))
        .collect()
}

/// Ledger stored as a comma-separated file
pub struct CsvLedger {
    path: PathBuf,
    versions: RangeInclusive<u8>,
}

impl CsvLedger {
    /// Open the ledger in `results_dir`, creating it with a header if needed
    ///
    /// A trailing partial line left by a crash mid-append is cut off. An
    /// existing header must match `versions`.
    pub async fn open(results_dir: &Path, versions: RangeInclusive<u8>) -> MatrixResult<Self> {
        fs::create_dir_all(results_dir).await.map_err(|e| {
            MatrixError::io(format!("creating results directory {}", results_dir.display()), e)
        })?;

        let path = results_dir.join(LEDGER_FILE);
        let expected = header(versions.clone());
        let mut content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(MatrixError::io(format!("reading ledger {}", path.display()), e));
            }
        };

        if !content.is_empty() && !content.ends_with('\n') {
            let keep = content.rfind('\n').map_or(0, |i| i + 1);
            warn!("Discarding incomplete last line of {}", path.display());
            truncate(&path, keep as u64).await?;
            content.truncate(keep);
        }

        if content.is_empty() {
            fs::write(&path, tabular::format_record(&expected))
                .await
                .map_err(|e| MatrixError::io(format!("writing ledger header {}", path.display()), e))?;
            debug!("Created ledger {}", path.display());
        } else {
            let found = content.lines().next().map(tabular::parse_record).unwrap_or_default();
            if found != expected {
                return Err(MatrixError::LedgerHeader {
                    path,
                    found: found.join(","),
                });
            }
        }

        Ok(Self { path, versions })
    }

    /// Ledger file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of a ledger file
    ///
    /// JDK columns are taken from the file's own header, so ledgers written
    /// with any range can be read.
    pub async fn read_rows(path: &Path) -> MatrixResult<Vec<ResultRow>> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MatrixError::io(format!("reading ledger {}", path.display()), e))?;
        parse_rows(path, &content)
    }
}

async fn truncate(path: &Path, len: u64) -> MatrixResult<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| MatrixError::io(format!("opening ledger {}", path.display()), e))?;
    file.set_len(len)
        .await
        .map_err(|e| MatrixError::io(format!("truncating ledger {}", path.display()), e))
}

fn parse_rows(path: &Path, content: &str) -> MatrixResult<Vec<ResultRow>> {
    let row_error = |line: usize, reason: String| MatrixError::LedgerRow {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut records = tabular::records(content);
    let Some((_, columns)) = records.next() else {
        return Ok(Vec::new());
    };

    if columns.len() < FIXED_COLUMNS.len() || columns[..FIXED_COLUMNS.len()] != FIXED_COLUMNS {
        return Err(MatrixError::LedgerHeader {
            path: path.to_path_buf(),
            found: columns.join(","),
        });
    }

    let versions = columns[FIXED_COLUMNS.len()..]
        .iter()
        .map(|column| {
            column
                .strip_prefix("java")
                .and_then(|v| v.parse::<u8>().ok())
                .ok_or_else(|| row_error(1, format!("unexpected column {}", column)))
        })
        .collect::<MatrixResult<Vec<u8>>>()?;

    records
        .map(|(line, fields)| {
            if fields.len() != columns.len() {
                return Err(row_error(
                    line,
                    format!("expected {} fields, found {}", columns.len(), fields.len()),
                ));
            }

            let tool = fields[2]
                .parse::<BuildTool>()
                .map_err(|tool| row_error(line, format!("unknown tool {}", tool)))?;

            let mut exit_codes = BTreeMap::new();
            for (version, value) in versions.iter().zip(&fields[FIXED_COLUMNS.len()..]) {
                let code = value
                    .parse::<i32>()
                    .map_err(|_| row_error(line, format!("java{} exit code {:?}", version, value)))?;
                exit_codes.insert(*version, code);
            }

            Ok(ResultRow {
                name: fields[0].clone(),
                commit: fields[1].clone(),
                tool,
                wrapper: (!fields[3].is_empty()).then(|| fields[3].clone()),
                exit_codes,
            })
        })
        .collect()
}

#[async_trait]
impl Ledger for CsvLedger {
    async fn load_completed(&self) -> MatrixResult<HashSet<String>> {
        let rows = Self::read_rows(&self.path).await?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    async fn append(&mut self, row: &ResultRow) -> MatrixResult<()> {
        let mut fields = vec![
            row.name.clone(),
            row.commit.clone(),
            row.tool.to_string(),
            row.wrapper.clone().unwrap_or_default(),
        ];
        for version in self.versions.clone() {
            let code = row.exit_codes.get(&version).ok_or_else(|| {
                MatrixError::User(format!("{} has no result for Java {}", row.name, version))
            })?;
            fields.push(code.to_string());
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| MatrixError::io(format!("opening ledger {}", self.path.display()), e))?;

        file.write_all(tabular::format_record(&fields).as_bytes())
            .await
            .map_err(|e| MatrixError::io(format!("appending to ledger {}", self.path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| MatrixError::io("flushing ledger", e))?;
        file.sync_data()
            .await
            .map_err(|e| MatrixError::io("syncing ledger", e))?;

        debug!("Committed {} to ledger", row.name);
        Ok(())
    }
}
