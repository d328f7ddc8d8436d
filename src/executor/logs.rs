//! Build log layout
//!
//! `<results>/<owner_name>/<NN>` while a build runs, then `<NN>.pass` or
//! `<NN>.fail` once its exit code is known.

use crate::error::{MatrixError, MatrixResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Create the log directory of a project and empty it of regular files
///
/// Logs of an interrupted earlier attempt are discarded along with its
/// missing ledger row.
pub async fn prepare_log_dir(results_dir: &Path, dir_name: &str) -> MatrixResult<PathBuf> {
    let log_dir = results_dir.join(dir_name);
    fs::create_dir_all(&log_dir)
        .await
        .map_err(|e| MatrixError::io(format!("creating log directory {}", log_dir.display()), e))?;

    let mut entries = fs::read_dir(&log_dir)
        .await
        .map_err(|e| MatrixError::io(format!("reading log directory {}", log_dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MatrixError::io(format!("reading log directory {}", log_dir.display()), e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MatrixError::io(format!("inspecting {}", entry.path().display()), e))?;
        if file_type.is_file() {
            fs::remove_file(entry.path())
                .await
                .map_err(|e| MatrixError::io(format!("removing stale log {}", entry.path().display()), e))?;
            debug!("Removed stale log {}", entry.path().display());
        }
    }

    Ok(log_dir)
}

/// Path a running build writes its log to
pub fn running_log_path(log_dir: &Path, version: u8) -> PathBuf {
    log_dir.join(format!("{:02}", version))
}

/// Rename a finished build's log by outcome, returning the new path
pub async fn finish_log(running: &Path, exit_code: i32) -> MatrixResult<PathBuf> {
    let suffix = if exit_code == 0 { "pass" } else { "fail" };
    let finished = running.with_extension(suffix);
    fs::rename(running, &finished)
        .await
        .map_err(|e| MatrixError::io(format!("renaming log {}", running.display()), e))?;
    Ok(finished)
}
