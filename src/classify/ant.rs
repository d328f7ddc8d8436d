//! Ant log parser
//!
//! The build image runs Ant several times in one container (a leading `clean`
//! and then one conventional target after another), so the log is a sequence of
//! transcripts, each opened by `Buildfile:` and closed by `Total time:`.

use super::INIT;
use regex::Regex;
use std::sync::LazyLock;

static TRANSCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Picked up .+\n)?Buildfile: /.+\n([\s\S]*?)\nTotal time: .+ seconds?\n")
        .expect("valid regex")
});

static MISSING_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"BUILD FAILED\nTarget "(jar|war|dist)" does not exist in the project"#)
        .expect("valid regex")
});

static TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([\w.-]+):$").expect("valid regex"));

/// Error type of a failed Ant build
pub fn error_type(log: &str) -> String {
    let transcripts: Vec<&str> = TRANSCRIPT
        .captures_iter(log)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str())
        .collect();

    // The first transcript is the `clean` run, unless it is the only one
    let candidates = if transcripts.len() > 1 {
        &transcripts[1..]
    } else {
        &transcripts[..]
    };

    let Some(last) = candidates.last() else {
        return INIT.to_string();
    };

    let analyzed = candidates
        .iter()
        .find(|transcript| !MISSING_TARGET.is_match(transcript))
        .unwrap_or(last);

    TARGET
        .captures_iter(analyzed)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|target| format!("ant:{}", target.as_str()))
        .unwrap_or_else(|| INIT.to_string())
}
