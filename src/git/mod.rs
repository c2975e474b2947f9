//! Repository status abstraction
//!
//! The orchestrator only needs one question answered per project directory:
//! is it under version control, and if so, does anything tracked beneath it
//! differ from the last commit. [`StatusProbe`] answers that question.
//!
//! - [repository::Git2Repository]: real implementation on top of `git2`
//! - [mock::MockRepository]: fixed answers for tests
//!
//! ```rust
//! # use verbump::git::{RepoStatus, StatusProbe};
//! # use std::path::Path;
//! # fn example<P: StatusProbe>(probe: &P) -> verbump::Result<()> {
//! if probe.status(Path::new("packages/core"))? == RepoStatus::Modified {
//!     println!("packages/core has uncommitted work");
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::fmt;
use std::path::Path;

/// Modification state of a project directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    /// The directory is not inside a git repository
    NoRepository,
    /// Tracked files match the last commit
    Clean,
    /// At least one tracked file beneath the directory changed
    Modified,
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoStatus::NoRepository => write!(f, "no repository"),
            RepoStatus::Clean => write!(f, "clean"),
            RepoStatus::Modified => write!(f, "modified"),
        }
    }
}

/// Answers whether a directory is versioned and whether it has modifications.
///
/// Implementors must be `Send + Sync`. Errors are reserved for failures of
/// the query itself; "not a repository" is a normal [RepoStatus].
pub trait StatusProbe: Send + Sync {
    fn status(&self, directory: &Path) -> Result<RepoStatus>;
}

impl<P: StatusProbe + ?Sized> StatusProbe for &P {
    fn status(&self, directory: &Path) -> Result<RepoStatus> {
        (**self).status(directory)
    }
}
