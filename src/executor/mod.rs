//! Build matrix executor
//!
//! Builds each pending project once per JDK version, strictly one container at
//! a time. A project's row reaches the ledger only after all of its versions
//! were attempted; cache volumes are purged before the next project starts.

pub mod logs;

use crate::cache::CacheManager;
use crate::config::{Config, MissingToolPolicy};
use crate::error::{MatrixError, MatrixResult};
use crate::ledger::{Ledger, ResultRow};
use crate::orchestration::{ContainerConfig, ContainerHandle, ContainerRuntime, Mount};
use crate::project::{jdk_order, project_name, Project};
use indicatif::ProgressBar;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Projects committed to the ledger
    pub built: usize,
    /// Projects without a build file
    pub skipped: usize,
    /// Builds that exited with 0
    pub passed: usize,
    /// Builds that exited with anything else
    pub failed: usize,
}

/// Runs the project × JDK matrix
pub struct MatrixExecutor {
    runtime: Arc<dyn ContainerRuntime>,
    cache: CacheManager,
    handle: ContainerHandle,
    image: String,
    project_mount: String,
    versions: RangeInclusive<u8>,
    on_missing_tool: MissingToolPolicy,
    progress: ProgressBar,
}

impl MatrixExecutor {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, handle: ContainerHandle, config: &Config) -> Self {
        let cache = CacheManager::new(runtime.clone(), &config.container.image, &config.cache.dirs);
        Self {
            runtime,
            cache,
            handle,
            image: config.container.image.clone(),
            project_mount: config.container.project_mount.clone(),
            versions: config.matrix.jdk_range(),
            on_missing_tool: config.matrix.on_missing_tool,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report each finished project on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Build every project in order, committing each to `ledger`
    pub async fn run(
        &self,
        projects: &[PathBuf],
        results_dir: &Path,
        ledger: &mut dyn Ledger,
    ) -> MatrixResult<RunSummary> {
        let mut summary = RunSummary::default();

        // Volumes may survive a run that was killed mid-project
        self.cache.purge().await?;

        for project_dir in projects {
            self.progress.set_message(project_name(project_dir));

            if let Some(row) = self.build_project(project_dir, results_dir).await? {
                ledger.append(&row).await?;
                self.cache.purge().await?;

                summary.built += 1;
                for code in row.exit_codes.values() {
                    if *code == 0 {
                        summary.passed += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
            } else {
                summary.skipped += 1;
            }

            self.progress.inc(1);
        }

        Ok(summary)
    }

    /// Build one project with every JDK version
    ///
    /// Returns `None` when the project has no build file and the policy is
    /// to skip it.
    pub async fn build_project(&self, project_dir: &Path, results_dir: &Path) -> MatrixResult<Option<ResultRow>> {
        info!("Analyzing {}", project_name(project_dir));

        let project = match Project::detect(project_dir).await {
            Ok(project) => project,
            Err(MatrixError::NoBuildTool(dir)) if self.on_missing_tool == MissingToolPolicy::Skip => {
                warn!("Skipping {}: no build script found", dir.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let log_dir = logs::prepare_log_dir(results_dir, &project.dir_name()).await?;
        let mut row = ResultRow::for_project(&project);

        for version in jdk_order(&project.name, self.versions.clone()) {
            info!("Building {} with Java {}", project.name, version);
            let exit_code = self.build(&project, version, &log_dir).await?;
            row.exit_codes.insert(version, exit_code);
        }

        Ok(Some(row))
    }

    /// One containerized build, returning its exit code
    async fn build(&self, project: &Project, version: u8, log_dir: &Path) -> MatrixResult<i32> {
        let container = self.container_config(project, version);
        let log_path = logs::running_log_path(log_dir, version);

        let exit_code = self.runtime.run_to_log(&container, &log_path).await?;
        logs::finish_log(&log_path, exit_code).await?;

        if exit_code != 0 {
            info!("{} failed with Java {} (exit code {})", project.name, version, exit_code);
        }
        Ok(exit_code)
    }

    /// Container running `project`'s build under JDK `version`
    pub fn container_config(&self, project: &Project, version: u8) -> ContainerConfig {
        let mut mounts = vec![Mount::Bind {
            source: project.dir.clone(),
            target: self.project_mount.clone(),
            readonly: true,
        }];
        mounts.extend(self.cache.mounts());

        ContainerConfig {
            name: self.handle.name().to_string(),
            image: format!("{}:{}", self.image, version),
            mounts,
            command: vec![project.build_command().to_string()],
        }
    }
}
