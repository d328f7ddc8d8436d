//! Build tool detection
//!
//! A project is built by exactly one tool, chosen by the marker files in its
//! root directory. Subdirectories are never inspected: a Maven module nested in
//! a Gradle build does not make the project a Maven project.

use crate::classify;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Supported build tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildTool {
    /// Gradle (build.gradle, build.gradle.kts)
    Gradle,
    /// Maven (pom.xml)
    Maven,
    /// Ant (build.xml)
    Ant,
}

/// Log parser producing an error type for a failed build
pub type LogParser = fn(&str) -> String;

impl BuildTool {
    /// All tools in detection priority order
    pub const ALL: [BuildTool; 3] = [Self::Gradle, Self::Maven, Self::Ant];

    /// Build files marking a project as using this tool
    pub fn marker_files(&self) -> &'static [&'static str] {
        match self {
            Self::Gradle => &["build.gradle", "build.gradle.kts"],
            Self::Maven => &["pom.xml"],
            Self::Ant => &["build.xml"],
        }
    }

    /// Name of the system-installed tool binary
    pub fn command(&self) -> &'static str {
        match self {
            Self::Gradle => "gradle",
            Self::Maven => "mvn",
            Self::Ant => "ant",
        }
    }

    /// Name of the version-pinned wrapper script
    pub fn wrapper(&self) -> &'static str {
        match self {
            Self::Gradle => "gradlew",
            Self::Maven => "mvnw",
            Self::Ant => "antw",
        }
    }

    /// Parser turning this tool's failed-build log into an error type
    pub fn log_parser(&self) -> LogParser {
        match self {
            Self::Gradle => classify::gradle::error_type,
            Self::Maven => classify::maven::error_type,
            Self::Ant => classify::ant::error_type,
        }
    }

    /// Detect the tool of a project from its root directory
    pub fn detect(project_dir: &Path) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| {
            tool.marker_files().iter().any(|file| {
                let found = project_dir.join(file).is_file();
                if found {
                    debug!("Found {} build file: {}", tool, file);
                }
                found
            })
        })
    }

    /// The wrapper script, if the project ships one in its root
    pub fn detect_wrapper(&self, project_dir: &Path) -> Option<&'static str> {
        let wrapper = self.wrapper();
        project_dir.join(wrapper).is_file().then_some(wrapper)
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gradle => "Gradle",
            Self::Maven => "Maven",
            Self::Ant => "Ant",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BuildTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gradle" => Ok(Self::Gradle),
            "Maven" => Ok(Self::Maven),
            "Ant" => Ok(Self::Ant),
            other => Err(other.to_string()),
        }
    }
}
