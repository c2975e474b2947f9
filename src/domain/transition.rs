//! Version transition rules
//!
//! - `Advance` on a release starts a new series: patch + 1, `<tag>.1`.
//! - `Advance` on a pre-release continues the series: ordinal + 1.
//!   The stored tag must equal the configured tag.
//! - `Finalize` drops the suffix. Finalizing a release is a no-op.

use crate::domain::prerelease::{PreRelease, PreReleaseTag};
use crate::domain::version::Version;
use crate::error::{BumpError, Result};
use std::fmt;

/// What a run does to each manifest version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bump the pre-release (`bump` on the command line)
    Advance,
    /// Strip the pre-release suffix and tag a release (`release`)
    Finalize,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Advance => write!(f, "bump"),
            Mode::Finalize => write!(f, "release"),
        }
    }
}

impl Version {
    /// Next pre-release for the configured tag
    pub fn advance(&self, tag: &PreReleaseTag) -> Result<Version> {
        match &self.pre {
            None => {
                let patch = self.patch.checked_add(1).ok_or_else(|| {
                    BumpError::parse(format!("Patch component of {} is out of range", self))
                })?;
                Ok(Version::new(self.major, self.minor, patch).with_pre(PreRelease::first(tag)))
            }
            Some(pre) if pre.tag == tag.as_str() => Ok(self.release().with_pre(pre.next()?)),
            Some(pre) => Err(BumpError::TagMismatch {
                found: pre.tag.clone(),
                expected: tag.to_string(),
            }),
        }
    }

    pub fn finalize(&self) -> Version {
        self.release()
    }
}

/// Compute the version that follows `current` under `mode`.
///
/// `current` is the raw manifest field; `None` means the manifest had no
/// version at all.
pub fn compute_next(current: Option<&str>, mode: Mode, tag: &PreReleaseTag) -> Result<Version> {
    let raw = current.ok_or_else(|| BumpError::MissingVersion("manifest".to_string()))?;
    let version = Version::parse(raw)?;
    match mode {
        Mode::Advance => version.advance(tag),
        Mode::Finalize => Ok(version.finalize()),
    }
}
