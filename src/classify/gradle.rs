//! Gradle log parser
//!
//! Gradle announces each task as `> Task :path:name` (or a bare `:name` on old
//! versions) and marks the one that broke with a trailing ` FAILED`.

use super::{INIT, RESOLVE};
use regex::Regex;
use std::sync::LazyLock;

const RESOLVE_MARKER: &str = "> Could not resolve ";
const FAILED_MARKER: &str = " FAILED";

// The repeated group captures the last `:segment` of the task path
static TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(> Task )?(:[\w.-]+)+").expect("valid regex"));

/// Error type of a failed Gradle build
pub fn error_type(log: &str) -> String {
    let mut last_task: Option<&str> = None;

    for line in log.lines() {
        if line.starts_with(RESOLVE_MARKER) {
            return RESOLVE.to_string();
        }

        if let Some(task) = TASK.captures(line).and_then(|caps| caps.get(2)) {
            last_task = Some(task.as_str());
        }

        if let Some(task) = last_task {
            if line.ends_with(FAILED_MARKER) {
                return task.to_string();
            }
        }
    }

    INIT.to_string()
}
