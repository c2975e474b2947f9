//! Pre-release suffix handling
//!
//! A pre-release suffix has the shape `<tag>.<ordinal>`, e.g. `pre-release.3`.
//! The tag names the series and the ordinal counts releases within it.

use crate::error::{BumpError, Result};
use std::fmt;
use std::str::FromStr;

/// Default tag for a new pre-release series
pub const DEFAULT_PRE_RELEASE_TAG: &str = "pre-release";

/// A validated pre-release tag as configured for a run.
///
/// Accepts ASCII alphanumerics and hyphens only, so the tag can never be
/// confused with the ordinal separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreReleaseTag(String);

impl PreReleaseTag {
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PreReleaseTag {
    fn default() -> Self {
        PreReleaseTag(DEFAULT_PRE_RELEASE_TAG.to_string())
    }
}

impl FromStr for PreReleaseTag {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(BumpError::config("Empty pre-release tag"));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(BumpError::config(format!(
                "Invalid pre-release tag: '{}' (use letters, digits and '-')",
                s
            )));
        }
        Ok(PreReleaseTag(s.to_string()))
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pre-release suffix of a version: series tag plus ordinal (always >= 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub tag: String,
    pub ordinal: u64,
}

impl PreRelease {
    /// First release of a new series
    pub fn first(tag: &PreReleaseTag) -> Self {
        PreRelease {
            tag: tag.as_str().to_string(),
            ordinal: 1,
        }
    }

    /// Parse a suffix such as `beta.2`.
    ///
    /// The ordinal is everything after the last `.` and must be a positive
    /// integer; anything else is a parse failure rather than a zero.
    pub fn parse(s: &str) -> Result<Self> {
        let (tag, ordinal) = s.rsplit_once('.').ok_or_else(|| {
            BumpError::parse(format!(
                "Pre-release '{}' is missing its ordinal (expected <tag>.<n>)",
                s
            ))
        })?;

        if tag.is_empty() {
            return Err(BumpError::parse(format!("Pre-release '{}' has an empty tag", s)));
        }

        let ordinal = ordinal.parse::<u64>().map_err(|_| {
            BumpError::parse(format!("Invalid pre-release ordinal: '{}'", ordinal))
        })?;
        if ordinal == 0 {
            return Err(BumpError::parse(format!(
                "Pre-release ordinal must start at 1: '{}'",
                s
            )));
        }

        Ok(PreRelease {
            tag: tag.to_string(),
            ordinal,
        })
    }

    /// Next release in the same series
    pub fn next(&self) -> Result<Self> {
        let ordinal = self.ordinal.checked_add(1).ok_or_else(|| {
            BumpError::parse(format!("Pre-release ordinal in '{}' is out of range", self))
        })?;
        Ok(PreRelease {
            tag: self.tag.clone(),
            ordinal,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tag, self.ordinal)
    }
}
