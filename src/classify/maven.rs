//! Maven log parser

use super::{INIT, OTHER, RESOLVE};
use regex::Regex;
use std::sync::LazyLock;

const BUILD_STARTED: &str = "[INFO] Building";

static RESOLUTION_HELP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[ERROR\] \[Help \d\] http://.*/(Dependency|Plugin)ResolutionException\r?$")
        .expect("valid regex")
});

// groupId:artifactId:... the artifact (plugin) is the second token
static FAILED_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[ERROR\] (Failed to execute goal|Could not find goal '.+?' in plugin) .+?:(.+?):")
        .expect("valid regex")
});

/// Error type of a failed Maven build
///
/// A log without the reactor's build announcement failed before any project
/// was built. Resolution failures are checked before goal failures because
/// Maven reports both for an unresolvable plugin.
pub fn error_type(log: &str) -> String {
    if !log.contains(BUILD_STARTED) {
        return INIT.to_string();
    }

    if RESOLUTION_HELP.is_match(log) {
        return RESOLVE.to_string();
    }

    FAILED_GOAL
        .captures(log)
        .and_then(|caps| caps.get(2))
        .map(|plugin| plugin.as_str().to_string())
        .unwrap_or_else(|| OTHER.to_string())
}
