use crate::error::Result;
use crate::git::{RepoStatus, StatusProbe};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock probe returning preset statuses without touching git
pub struct MockRepository {
    statuses: HashMap<PathBuf, RepoStatus>,
    fallback: RepoStatus,
}

impl MockRepository {
    /// Create a mock that reports every directory as `fallback`
    pub fn new(fallback: RepoStatus) -> Self {
        MockRepository {
            statuses: HashMap::new(),
            fallback,
        }
    }

    /// Set the status reported for one directory
    pub fn set_status(&mut self, directory: impl Into<PathBuf>, status: RepoStatus) {
        self.statuses.insert(directory.into(), status);
    }

    pub fn with_status(mut self, directory: impl Into<PathBuf>, status: RepoStatus) -> Self {
        self.set_status(directory, status);
        self
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new(RepoStatus::Modified)
    }
}

impl StatusProbe for MockRepository {
    fn status(&self, directory: &Path) -> Result<RepoStatus> {
        Ok(self
            .statuses
            .get(directory)
            .copied()
            .unwrap_or(self.fallback))
    }
}
