//! Container runtime abstraction
//!
//! The executor, cache manager and supervisor talk to containers only through
//! this trait, so the docker and podman CLIs (and test doubles) are
//! interchangeable.

use crate::error::MatrixResult;
use crate::orchestration::container::ContainerConfig;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Abstract container runtime interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Fail early if the runtime cannot be used on this system
    async fn ensure_ready(&self) -> MatrixResult<()>;

    /// Run a container to completion, writing its combined stdout and stderr
    /// to `log_path`, and return its exit code
    async fn run_to_log(&self, config: &ContainerConfig, log_path: &Path) -> MatrixResult<i32>;

    /// Stop a container, killing it after `grace`
    async fn stop(&self, name: &str, grace: Duration) -> MatrixResult<()>;

    /// Remove a container, ignoring one that does not exist
    async fn remove(&self, name: &str) -> MatrixResult<()>;

    /// Check whether a named volume exists
    async fn volume_exists(&self, name: &str) -> MatrixResult<bool>;

    /// Remove a named volume
    async fn volume_remove(&self, name: &str) -> MatrixResult<()>;

    /// Get the human-readable runtime name for display
    fn runtime_name(&self) -> &str;
}
