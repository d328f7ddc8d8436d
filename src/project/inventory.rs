//! Project inventory scanning
//!
//! Every immediate subdirectory of the dataset root is one project. The
//! pending list is the shuffled inventory minus the projects the ledger
//! already holds.

use crate::error::{MatrixError, MatrixResult};
use crate::project::order::shuffle_seeded;
use crate::project::project_name;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// List project directories in their seeded processing order
///
/// Directories are sorted by name before shuffling, so the result never
/// depends on the order the filesystem lists them in.
pub async fn list_projects(dataset_dir: &Path, seed: u64) -> MatrixResult<Vec<PathBuf>> {
    if !dataset_dir.is_dir() {
        return Err(MatrixError::DatasetNotFound(dataset_dir.to_path_buf()));
    }

    let mut projects = Vec::new();
    let mut entries = fs::read_dir(dataset_dir)
        .await
        .map_err(|e| MatrixError::io(format!("reading dataset {}", dataset_dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MatrixError::io("reading dataset entry", e))?
    {
        let path = entry.path();
        if path.is_dir() {
            projects.push(path);
        }
    }

    projects.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    shuffle_seeded(&mut projects, seed);
    debug!("Found {} projects in {}", projects.len(), dataset_dir.display());
    Ok(projects)
}

/// Projects not yet present in the ledger, in processing order
pub async fn pending_projects(
    dataset_dir: &Path,
    completed: &HashSet<String>,
    seed: u64,
) -> MatrixResult<Vec<PathBuf>> {
    let projects = list_projects(dataset_dir, seed).await?;
    let total = projects.len();

    let pending: Vec<PathBuf> = projects
        .into_iter()
        .filter(|dir| !completed.contains(&project_name(dir)))
        .collect();

    info!(
        "{} of {} projects pending ({} already complete)",
        pending.len(),
        total,
        total - pending.len()
    );
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dataset(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        // Files are not projects
        std::fs::write(dir.path().join("README"), "").unwrap();
        dir
    }

    fn names(dirs: &[PathBuf]) -> Vec<String> {
        dirs.iter().map(|d| project_name(d)).collect()
    }

    #[tokio::test]
    async fn pending_for_empty_ledger_is_all() {
        let data = dataset(&["project_1", "project_2", "project_3"]);
        let pending = pending_projects(data.path(), &HashSet::new(), 42).await.unwrap();

        let mut found = names(&pending);
        found.sort();
        assert_eq!(found, vec!["project/1", "project/2", "project/3"]);
    }

    #[tokio::test]
    async fn pending_for_partial_ledger_is_remaining() {
        let data = dataset(&["project_1", "project_2", "project_3"]);
        let completed: HashSet<String> =
            ["project/1", "project/3"].iter().map(|s| s.to_string()).collect();

        let pending = pending_projects(data.path(), &completed, 42).await.unwrap();
        assert_eq!(names(&pending), vec!["project/2"]);
    }

    #[tokio::test]
    async fn pending_for_full_ledger_is_none() {
        let data = dataset(&["project_1", "project_2"]);
        let completed: HashSet<String> =
            ["project/1", "project/2"].iter().map(|s| s.to_string()).collect();

        let pending = pending_projects(data.path(), &completed, 42).await.unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn order_is_reproducible_and_filter_preserves_it() {
        let all: Vec<String> = (0..20).map(|i| format!("owner_repo{:02}", i)).collect();
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let data = dataset(&refs);

        let first = list_projects(data.path(), 42).await.unwrap();
        let second = list_projects(data.path(), 42).await.unwrap();
        assert_eq!(first, second);

        let completed: HashSet<String> = names(&first[..5]).into_iter().collect();
        let pending = pending_projects(data.path(), &completed, 42).await.unwrap();
        assert_eq!(pending, first[5..].to_vec());
    }

    #[tokio::test]
    async fn missing_dataset_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = list_projects(&dir.path().join("missing"), 42).await.unwrap_err();
        assert!(matches!(err, MatrixError::DatasetNotFound(_)));
    }
}
