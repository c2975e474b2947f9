use crate::domain::prerelease::PreRelease;
use crate::error::{BumpError, Result};
use std::fmt;
use std::str::FromStr;

/// Manifest version: `major.minor.patch` with an optional `-<tag>.<ordinal>` suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<PreRelease>,
}

impl Version {
    /// Create a plain release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    pub fn with_pre(mut self, pre: PreRelease) -> Self {
        self.pre = Some(pre);
        self
    }

    /// Parse a manifest version string (e.g. "1.2.4-pre-release.2").
    ///
    /// Build metadata and suffixes that are not `<tag>.<ordinal>` are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let parsed = semver::Version::parse(s)
            .map_err(|e| BumpError::parse(format!("Invalid version '{}': {}", s, e)))?;

        if !parsed.build.is_empty() {
            return Err(BumpError::parse(format!(
                "Invalid version '{}': build metadata is not supported",
                s
            )));
        }

        let pre = if parsed.pre.is_empty() {
            None
        } else {
            Some(PreRelease::parse(parsed.pre.as_str())?)
        };

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre,
        })
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }

    /// The same version without its pre-release suffix
    pub fn release(&self) -> Self {
        Version::new(self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}
