//! Error types for jdkmatrix
//!
//! All modules use `MatrixResult<T>` as their return type. A failed build is
//! not an error: it is an exit code recorded in the ledger.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jdkmatrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;

/// All errors that can occur in jdkmatrix
#[derive(Error, Debug)]
pub enum MatrixError {
    // Environment errors
    #[error("Container runtime not found: {0}")]
    RuntimeNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigValue(String),

    #[error("Dataset directory not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("Results directory not found: {0}")]
    ResultsNotFound(PathBuf),

    // Project errors
    #[error("No build script found in {0}")]
    NoBuildTool(PathBuf),

    // Ledger errors
    #[error("Ledger {path} has an unexpected header: {found}")]
    LedgerHeader { path: PathBuf, found: String },

    #[error("Malformed ledger row at {path}:{line}: {reason}")]
    LedgerRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed category table at {path}:{line}: {reason}")]
    CategoryTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed error type report at {path}:{line}: {reason}")]
    ErrorTypesRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("No failures of type {error_type} in {path}")]
    UnknownErrorType { error_type: String, path: PathBuf },

    // Container errors
    #[error("Cache volume operation failed: {volume}: {reason}")]
    CacheVolume { volume: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Interrupted by {0}")]
    Interrupted(crate::supervisor::ShutdownSignal),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl MatrixError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted(signal) => signal.exit_code(),
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RuntimeNotFound(_) => {
                Some("Install docker or podman, or set [container] runtime in the config")
            }
            Self::NoBuildTool(_) => Some("Set [matrix] on_missing_tool = \"skip\" to continue past such projects"),
            Self::LedgerHeader { .. } => {
                Some("The JDK range in the config must match the one the ledger was created with")
            }
            Self::UnknownErrorType { .. } => {
                Some("Error types are case-sensitive; `classify` lists the ones found")
            }
            _ => None,
        }
    }
}
