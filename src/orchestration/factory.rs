//! Runtime factory for creating the configured container runtime

use crate::config::Config;
use crate::error::{MatrixError, MatrixResult};
use crate::orchestration::cli_runtime::CliRuntime;
use crate::orchestration::runtime::ContainerRuntime;
use std::sync::Arc;

/// Container CLIs known to accept the commands jdkmatrix issues
pub const SUPPORTED_RUNTIMES: &[&str] = &["docker", "podman"];

/// Create the container runtime named in the configuration
pub fn create_runtime(config: &Config) -> MatrixResult<Arc<dyn ContainerRuntime>> {
    let binary = config.container.runtime.as_str();
    if SUPPORTED_RUNTIMES.contains(&binary) {
        Ok(Arc::new(CliRuntime::new(binary)))
    } else {
        Err(MatrixError::ConfigValue(format!(
            "container.runtime \"{}\" is not one of {}",
            binary,
            SUPPORTED_RUNTIMES.join(", ")
        )))
    }
}
