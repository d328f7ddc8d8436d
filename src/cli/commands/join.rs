//! Join command - merge results directories

use crate::cli::args::JoinArgs;
use crate::error::{MatrixError, MatrixResult};
use crate::join::join_results;
use crate::ui::{self, UiContext};

/// Execute the join command
pub async fn execute(args: JoinArgs) -> MatrixResult<()> {
    let ctx = UiContext::detect();
    let (sources, target) = args
        .split()
        .ok_or_else(|| MatrixError::User("join needs source and target directories".to_string()))?;

    let summary = join_results(sources, target).await?;

    ui::step_ok(
        &ctx,
        &format!(
            "Joined {} director(ies) into {}: {} row(s), {} log director(ies)",
            summary.sources,
            target.display(),
            summary.rows,
            summary.log_dirs
        ),
    );
    Ok(())
}
