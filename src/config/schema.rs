//! Configuration schema for jdkmatrix
//!
//! Configuration is stored at `~/.config/jdkmatrix/config.toml`. Every section
//! is optional; missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container settings
    pub container: ContainerConfig,

    /// Build matrix settings
    pub matrix: MatrixConfig,

    /// Dependency cache settings
    pub cache: CacheConfig,

    /// Failure classification settings
    pub classify: ClassifyConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), String> {
        if self.matrix.min_jdk == 0 || self.matrix.min_jdk > self.matrix.max_jdk {
            return Err(format!(
                "matrix JDK range {}..={} is empty or starts at zero",
                self.matrix.min_jdk, self.matrix.max_jdk
            ));
        }
        if self.matrix.max_jdk > 99 {
            return Err(format!(
                "matrix.max_jdk = {} does not fit a two-digit log name",
                self.matrix.max_jdk
            ));
        }
        if self.container.image.trim().is_empty() {
            return Err("container.image must not be empty".to_string());
        }
        if self.container.name.trim().is_empty() {
            return Err("container.name must not be empty".to_string());
        }
        if !self.container.project_mount.starts_with('/') {
            return Err("container.project_mount must be an absolute path".to_string());
        }
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(format!(
                "general.log_format must be \"text\" or \"json\", got \"{}\"",
                self.general.log_format
            ));
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Seed for the project order shuffle
    pub seed: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            seed: 42,
        }
    }
}

/// Container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Container CLI to drive ("docker" or "podman")
    pub runtime: String,

    /// Image repository; one tag per JDK version is expected
    pub image: String,

    /// Fixed name of the build container
    pub name: String,

    /// Where the project source is mounted (read-only)
    pub project_mount: String,

    /// Seconds a container gets to stop before it is killed
    pub stop_grace_secs: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image: "sulir/jdk-study".to_string(),
            name: "jdkmatrix-build".to_string(),
            project_mount: "/mnt/project".to_string(),
            stop_grace_secs: 10,
        }
    }
}

/// What to do with a project that has no recognized build script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingToolPolicy {
    /// Warn, record nothing and continue with the next project
    #[default]
    Skip,
    /// Stop the whole run
    Abort,
}

/// Build matrix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Lowest JDK major version built
    pub min_jdk: u8,

    /// Highest JDK major version built
    pub max_jdk: u8,

    /// Handling of projects without a build script
    pub on_missing_tool: MissingToolPolicy,
}

impl MatrixConfig {
    /// All JDK versions in ascending order
    pub fn jdk_range(&self) -> RangeInclusive<u8> {
        self.min_jdk..=self.max_jdk
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            min_jdk: 6,
            max_jdk: 23,
            on_missing_tool: MissingToolPolicy::Skip,
        }
    }
}

/// Dependency cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directories inside the container, each backed by a volume
    pub dirs: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dirs: vec![
                "/root/.gradle/caches/modules-2/files-2.1".to_string(),
                "/root/.gradle/wrapper/dists".to_string(),
                "/root/.m2/repository".to_string(),
                "/root/.m2/wrapper".to_string(),
                "/root/.ivy2/cache".to_string(),
            ],
        }
    }
}

/// Failure classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Exit code the image uses for a build that ran out of time
    pub timeout_exit_code: i32,

    /// Exit code of a crashed JVM
    pub crash_exit_code: i32,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            timeout_exit_code: 124,
            crash_exit_code: 134,
        }
    }
}
