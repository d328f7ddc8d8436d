//! Joining results directories
//!
//! A large dataset is split and run on several machines. Joining moves every
//! source's ledger rows and project log directories into one target and
//! removes the emptied sources.

use crate::error::{MatrixError, MatrixResult};
use crate::ledger::LEDGER_FILE;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// What a join moved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Sources merged and removed
    pub sources: usize,
    /// Ledger rows appended to the target
    pub rows: usize,
    /// Project log directories moved
    pub log_dirs: usize,
}

/// Merge `sources` into `target`, consuming the sources
///
/// All ledger headers are compared before anything is moved, so a mismatch
/// leaves every directory untouched.
pub async fn join_results(sources: &[PathBuf], target: &Path) -> MatrixResult<JoinSummary> {
    let target_ledger = target.join(LEDGER_FILE);
    let mut expected = read_header(&target_ledger).await?;

    for source in sources {
        if !source.is_dir() {
            return Err(MatrixError::ResultsNotFound(source.clone()));
        }
        let ledger = source.join(LEDGER_FILE);
        let header = read_header(&ledger).await?.ok_or_else(|| {
            MatrixError::User(format!("{} has no ledger header", ledger.display()))
        })?;

        match &expected {
            Some(expected) if *expected != header => {
                return Err(MatrixError::LedgerHeader {
                    path: ledger,
                    found: header,
                });
            }
            Some(_) => {}
            None => expected = Some(header),
        }
    }

    fs::create_dir_all(target)
        .await
        .map_err(|e| MatrixError::io(format!("creating {}", target.display()), e))?;

    let mut summary = JoinSummary::default();
    for source in sources {
        summary.rows += append_ledger(&source.join(LEDGER_FILE), &target_ledger).await?;
        summary.log_dirs += move_log_dirs(source, target).await?;
        fs::remove_dir(source)
            .await
            .map_err(|e| MatrixError::io(format!("removing {}", source.display()), e))?;
        summary.sources += 1;
        info!("Joined {} into {}", source.display(), target.display());
    }

    Ok(summary)
}

/// First line of a ledger, `None` when the file is missing or empty
async fn read_header(path: &Path) -> MatrixResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content.lines().next().map(|l| l.trim_end().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MatrixError::io(format!("reading ledger {}", path.display()), e)),
    }
}

/// Append the rows of `source` to `target` and delete `source`
async fn append_ledger(source: &Path, target: &Path) -> MatrixResult<usize> {
    let content = fs::read_to_string(source)
        .await
        .map_err(|e| MatrixError::io(format!("reading ledger {}", source.display()), e))?;

    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .await
        .map_err(|e| MatrixError::io(format!("opening ledger {}", target.display()), e))?;
    let target_has_header = out
        .metadata()
        .await
        .map_err(|e| MatrixError::io(format!("inspecting ledger {}", target.display()), e))?
        .len()
        > 0;

    let mut lines = content.lines();
    let header = lines.next();
    let mut appended = String::new();
    if let (false, Some(header)) = (target_has_header, header) {
        appended.push_str(header.trim_end());
        appended.push('\n');
    }

    let mut rows: usize = 0;
    for line in lines.filter(|line| !line.trim().is_empty()) {
        appended.push_str(line.trim_end());
        appended.push('\n');
        rows += 1;
    }

    out.write_all(appended.as_bytes())
        .await
        .map_err(|e| MatrixError::io(format!("appending to ledger {}", target.display()), e))?;
    out.sync_data()
        .await
        .map_err(|e| MatrixError::io("syncing ledger", e))?;

    fs::remove_file(source)
        .await
        .map_err(|e| MatrixError::io(format!("removing ledger {}", source.display()), e))?;
    Ok(rows)
}

async fn move_log_dirs(source: &Path, target: &Path) -> MatrixResult<usize> {
    let mut entries = fs::read_dir(source)
        .await
        .map_err(|e| MatrixError::io(format!("reading {}", source.display()), e))?;

    let mut moved = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MatrixError::io(format!("reading {}", source.display()), e))?
    {
        let path = entry.path();
        if path.is_dir() {
            let destination = target.join(entry.file_name());
            fs::rename(&path, &destination)
                .await
                .map_err(|e| MatrixError::io(format!("moving {}", path.display()), e))?;
            debug!("Moved {} to {}", path.display(), destination.display());
            moved += 1;
        }
    }
    Ok(moved)
}
