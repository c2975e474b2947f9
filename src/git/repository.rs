use crate::error::Result;
use crate::git::{RepoStatus, StatusProbe};
use git2::{ErrorCode, Repository as Git2Repo, Status, StatusOptions};
use log::debug;
use std::path::Path;

/// Status probe backed by libgit2
///
/// The repository is discovered from each directory separately, so project
/// directories may live in different repositories.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Repository;

impl Git2Repository {
    pub fn new() -> Self {
        Git2Repository
    }
}

impl StatusProbe for Git2Repository {
    fn status(&self, directory: &Path) -> Result<RepoStatus> {
        let repo = match Git2Repo::discover(directory) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(RepoStatus::NoRepository),
            Err(e) => return Err(e.into()),
        };

        // bare repositories have nothing to modify
        let Some(workdir) = repo.workdir() else {
            return Ok(RepoStatus::NoRepository);
        };

        let workdir = workdir.canonicalize()?;
        let target = directory.canonicalize()?;
        let relative = target.strip_prefix(&workdir).unwrap_or(Path::new(""));

        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        if !relative.as_os_str().is_empty() {
            // git pathspecs always use forward slashes
            let pathspec = relative.to_string_lossy().replace('\\', "/");
            options.pathspec(pathspec);
        }

        let statuses = repo.statuses(Some(&mut options))?;
        let modified = statuses
            .iter()
            .any(|entry| entry.status() != Status::CURRENT && !entry.status().is_ignored());

        debug!(
            "{}: {} changed entries under {}",
            directory.display(),
            statuses.len(),
            workdir.display()
        );

        Ok(if modified {
            RepoStatus::Modified
        } else {
            RepoStatus::Clean
        })
    }
}
