//! Core data model for runjs
//!
//! A run is one `Job`, which loads one `SourceUnit` and ends in one
//! `ExecutionOutcome`. Every failure carries the stage it happened in.

use std::fmt;
use std::path::{Path, PathBuf};

/// Literal name of the file a job loads from its code directory
pub const SOURCE_FILE_NAME: &str = "user_code.js";

/// A single run request, fixed at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    code_directory: PathBuf,
}

impl Job {
    #[must_use]
    pub fn new(code_directory: impl Into<PathBuf>) -> Self {
        Self {
            code_directory: code_directory.into(),
        }
    }

    #[must_use]
    pub fn code_directory(&self) -> &Path {
        &self.code_directory
    }
}

/// Loaded program text, immutable once read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
}

impl SourceUnit {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Exec,
}

impl Stage {
    /// Diagnostic prefix for failures in this stage
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "Error reading user code",
            Self::Exec => "Execution error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error types for loading and evaluating user code
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not valid UTF-8 (invalid byte at offset {offset})", path.display())]
    Decode { path: PathBuf, offset: usize },

    #[error("{}: is a directory, not a file", path.display())]
    NotAFile { path: PathBuf },

    #[error("engine initialisation failed: {message}")]
    Engine { message: String },

    #[error("{description}")]
    Execution { description: String },

    #[error("timed out after {limit_ms} ms")]
    Timeout { limit_ms: u64 },
}

impl RunError {
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn engine(message: impl fmt::Display) -> Self {
        Self::Engine {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn execution(description: impl Into<String>) -> Self {
        Self::Execution {
            description: description.into(),
        }
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Read { .. } | Self::Decode { .. } | Self::NotAFile { .. } => Stage::Read,
            Self::Engine { .. } | Self::Execution { .. } | Self::Timeout { .. } => Stage::Exec,
        }
    }
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure { stage: Stage, message: String },
}

impl ExecutionOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Process exit status for this outcome: 0 on success, 1 on any failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure { .. } => 1,
        }
    }

    /// Diagnostic line for standard error, `None` on success
    #[must_use]
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Success => None,
            Self::Failure { stage, message } => Some(format!("{stage}: {message}")),
        }
    }
}

impl From<RunError> for ExecutionOutcome {
    fn from(error: RunError) -> Self {
        Self::Failure {
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

impl From<Result<(), RunError>> for ExecutionOutcome {
    fn from(result: Result<(), RunError>) -> Self {
        result.map_or_else(Self::from, |()| Self::Success)
    }
}
