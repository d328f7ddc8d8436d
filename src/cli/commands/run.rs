//! Run command - build the pending projects of a dataset

use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{MatrixError, MatrixResult};
use crate::executor::{MatrixExecutor, RunSummary};
use crate::ledger::{CsvLedger, Ledger};
use crate::orchestration::{create_runtime, ContainerHandle};
use crate::project::pending_projects;
use crate::supervisor::Supervisor;
use crate::ui::{self, UiContext};
use std::time::Duration;
use tracing::debug;

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> MatrixResult<()> {
    let ctx = UiContext::detect();

    if !args.dataset_dir.is_dir() {
        return Err(MatrixError::DatasetNotFound(args.dataset_dir));
    }

    let runtime = create_runtime(config)?;
    runtime.ensure_ready().await?;
    debug!("Using runtime: {}", runtime.runtime_name());

    let mut ledger = CsvLedger::open(&args.results_dir, config.matrix.jdk_range()).await?;
    let completed = ledger.load_completed().await?;
    let projects = pending_projects(&args.dataset_dir, &completed, config.general.seed).await?;

    ui::intro(&ctx, "jdkmatrix");
    ui::key_value(&ctx, "Dataset", &args.dataset_dir.display().to_string());
    ui::key_value(&ctx, "Results", &ledger.path().display().to_string());
    ui::key_value(
        &ctx,
        "Java",
        &format!("{} to {}", config.matrix.min_jdk, config.matrix.max_jdk),
    );
    ui::key_value(
        &ctx,
        "Projects",
        &format!("{} pending, {} complete", projects.len(), completed.len()),
    );

    let supervisor = Supervisor::new(
        runtime.clone(),
        ContainerHandle::new(config.container.name.clone()),
        Duration::from_secs(config.container.stop_grace_secs),
    );
    supervisor.clear_stale().await?;

    let bar = ui::project_bar(&ctx, projects.len());
    let executor =
        MatrixExecutor::new(runtime, supervisor.handle().clone(), config).with_progress(bar.clone());

    let result = supervisor
        .supervise(executor.run(&projects, &args.results_dir, &mut ledger))
        .await;
    bar.finish_and_clear();

    print_summary(&ctx, &result?);
    Ok(())
}

fn print_summary(ctx: &UiContext, summary: &RunSummary) {
    ui::section(ctx, "Summary");
    ui::step_ok(
        ctx,
        &format!(
            "{} project(s) built: {} passed, {} failed",
            summary.built, summary.passed, summary.failed
        ),
    );
    if summary.skipped > 0 {
        ui::step_warn(
            ctx,
            &format!("{} project(s) skipped without a build script", summary.skipped),
        );
    }
    ui::outro_success(ctx, "Run complete");
}
