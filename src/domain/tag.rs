use crate::domain::version::Version;
use std::fmt;

/// A git tag marking a finalized release (e.g. "v1.2.4")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
}

impl ReleaseTag {
    pub fn for_version(version: &Version) -> Self {
        ReleaseTag {
            name: format!("v{}", version),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
