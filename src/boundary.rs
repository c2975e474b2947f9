use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions hit while processing a project directory.
/// These are reported to the user; the run moves on to the next directory.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tracked modifications, so there is nothing to bump
    NothingToCommit { directory: PathBuf },
    /// Stored pre-release tag differs from the configured one
    TagMismatch {
        directory: PathBuf,
        found: String,
        expected: String,
    },
    /// Release requested for a version that is already final, with a clean tree
    AlreadyReleased { directory: PathBuf, version: String },
    /// Processing stopped before any external step ran: the status check,
    /// the manifest or the manifest write failed
    Halted { directory: PathBuf, reason: String },
    /// An external step (commit, tag, push, publish) failed
    StepFailed {
        directory: PathBuf,
        step: String,
        reason: String,
    },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NothingToCommit { directory } => {
                write!(f, "{}: nothing to commit, skipping", directory.display())
            }
            BoundaryWarning::TagMismatch {
                directory,
                found,
                expected,
            } => write!(
                f,
                "{}: pre-existing version tag '{}' differs from '{}'; release first",
                directory.display(),
                found,
                expected
            ),
            BoundaryWarning::AlreadyReleased { directory, version } => write!(
                f,
                "{}: version {} is already a release and nothing changed",
                directory.display(),
                version
            ),
            BoundaryWarning::Halted { directory, reason } => {
                write!(f, "{}: halted: {}", directory.display(), reason)
            }
            BoundaryWarning::StepFailed {
                directory,
                step,
                reason,
            } => write!(f, "{}: {} failed: {}", directory.display(), step, reason),
        }
    }
}
