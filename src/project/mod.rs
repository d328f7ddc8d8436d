//! Projects of the dataset
//!
//! A project directory is named by its flattened `owner_name` identity; the
//! first `_` stands for the `/` of `owner/name`.

pub mod inventory;
pub mod order;
pub mod tool;

pub use inventory::{list_projects, pending_projects};
pub use order::jdk_order;
pub use tool::{BuildTool, LogParser};

use crate::error::{MatrixError, MatrixResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

/// Recover the `owner/name` identity from a project directory
pub fn project_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|name| name.to_string_lossy().replacen('_', "/", 1))
        .unwrap_or_default()
}

/// Directory name of a project identity
pub fn flatten_name(name: &str) -> String {
    name.replacen('/', "_", 1)
}

/// A project ready to be built
#[derive(Debug, Clone)]
pub struct Project {
    /// `owner/name` identity
    pub name: String,
    /// Source directory
    pub dir: PathBuf,
    /// Detected build tool
    pub tool: BuildTool,
    /// Wrapper script in the project root, if any
    pub wrapper: Option<&'static str>,
    /// HEAD commit, empty when the source is not a git checkout
    pub commit: String,
}

impl Project {
    /// Inspect a project directory
    ///
    /// Fails with [`MatrixError::NoBuildTool`] when no marker file is present;
    /// the caller decides whether that ends the run.
    pub async fn detect(project_dir: &Path) -> MatrixResult<Self> {
        let dir = project_dir
            .canonicalize()
            .map_err(|e| MatrixError::io(format!("resolving project path {}", project_dir.display()), e))?;

        let tool = BuildTool::detect(&dir).ok_or_else(|| MatrixError::NoBuildTool(dir.clone()))?;
        let wrapper = tool.detect_wrapper(&dir);
        let commit = head_commit(&dir).await;

        Ok(Self {
            name: project_name(project_dir),
            dir,
            tool,
            wrapper,
            commit,
        })
    }

    /// Command run inside the container: the wrapper when present
    pub fn build_command(&self) -> &'static str {
        self.wrapper.unwrap_or_else(|| self.tool.command())
    }

    /// Flattened directory name, shared by the dataset and the log tree
    pub fn dir_name(&self) -> String {
        flatten_name(&self.name)
    }
}

/// `git rev-parse HEAD` of a checkout, or an empty string
async fn head_commit(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(output) => {
            warn!(
                "No commit recorded for {}: {}",
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            String::new()
        }
        Err(e) => {
            warn!("No commit recorded for {}: git failed: {}", dir.display(), e);
            String::new()
        }
    }
}
