//! Progress indicators with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the projects of a run
///
/// Hidden outside an interactive terminal, where the log lines already tell
/// what is happening.
pub fn project_bar(ctx: &UiContext, projects: usize) -> ProgressBar {
    if !ctx.use_fancy_output() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(projects as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "  {spinner:.cyan} {bar:30.cyan/dim} {pos}/{len} projects  {msg:.dim}  {elapsed:.dim}",
    ) {
        bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("━╸─"));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
