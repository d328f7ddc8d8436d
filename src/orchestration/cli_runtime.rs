//! Container runtime driven through the docker or podman CLI
//!
//! Both CLIs share the subset of commands used here (`run`, `stop`, `rm`,
//! `volume inspect`, `volume rm`), so one implementation serves both.

use crate::error::{MatrixError, MatrixResult};
use crate::orchestration::container::ContainerConfig;
use crate::orchestration::runtime::ContainerRuntime;
use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::fs::File;
use tokio::process::Command;
use tracing::debug;

/// Container runtime that shells out to a container CLI
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    /// Create a runtime for the given CLI binary
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Execute a runtime command and return the output
    async fn exec(&self, args: &[&str]) -> MatrixResult<std::process::Output> {
        debug!("Executing: {} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| MatrixError::command_failed(format!("{} {:?}", self.binary, args), e))
    }
}

/// Exit code of a finished process; signal deaths map to `128 + signal`
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn ensure_ready(&self) -> MatrixResult<()> {
        let available = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            Ok(())
        } else {
            Err(MatrixError::RuntimeNotFound(self.binary.clone()))
        }
    }

    async fn run_to_log(&self, config: &ContainerConfig, log_path: &Path) -> MatrixResult<i32> {
        let log = File::create(log_path)
            .await
            .map_err(|e| MatrixError::io(format!("creating log {}", log_path.display()), e))?
            .into_std()
            .await;
        let log_err = log
            .try_clone()
            .map_err(|e| MatrixError::io(format!("duplicating log handle {}", log_path.display()), e))?;

        let args = config.run_args();
        debug!("Running container: {} {:?}", self.binary, args);

        // Dropping this future (on interrupt) kills the client process; the
        // container itself is stopped by the supervisor.
        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| MatrixError::command_failed(format!("{} run", self.binary), e))?;

        Ok(exit_code(status))
    }

    async fn stop(&self, name: &str, grace: Duration) -> MatrixResult<()> {
        debug!("Stopping container: {}", name);

        let grace = grace.as_secs().to_string();
        let output = self.exec(&["stop", "-t", &grace, name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MatrixError::command_exec(format!("{} stop", self.binary), stderr))
        }
    }

    async fn remove(&self, name: &str) -> MatrixResult<()> {
        debug!("Removing container: {}", name);

        let output = self.exec(&["rm", "-f", name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            // Ignore error if container doesn't exist
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.to_lowercase().contains("no such container") {
                Ok(())
            } else {
                Err(MatrixError::command_exec(format!("{} rm", self.binary), stderr))
            }
        }
    }

    async fn volume_exists(&self, name: &str) -> MatrixResult<bool> {
        let output = self.exec(&["volume", "inspect", name]).await?;
        Ok(output.status.success())
    }

    async fn volume_remove(&self, name: &str) -> MatrixResult<()> {
        debug!("Removing volume: {}", name);

        let output = self.exec(&["volume", "rm", name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MatrixError::CacheVolume {
                volume: name.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn runtime_name(&self) -> &str {
        &self.binary
    }
}
