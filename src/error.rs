use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unified error type for verbump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Pre-release tag '{found}' differs from '{expected}'; release before switching tags")]
    TagMismatch { found: String, expected: String },

    #[error("No version field in {0}")]
    MissingVersion(String),

    #[error("No git repository found for {}", .0.display())]
    NoRepository(PathBuf),

    #[error("Project directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Command `{command}` failed: {stderr}")]
    ExternalCommand { command: String, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in verbump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// Create a parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        BumpError::Parse(msg.into())
    }

    pub fn not_found(path: impl AsRef<Path>) -> Self {
        BumpError::NotFound(path.as_ref().to_path_buf())
    }

    pub fn external(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        BumpError::ExternalCommand {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Process exit code for an error that ends the whole run.
    pub fn exit_code(&self) -> i32 {
        match self {
            BumpError::MissingDirectory(_) => 2,
            BumpError::NoRepository(_) => 3,
            _ => 1,
        }
    }
}
