//! Domain logic - pure version rules independent of git and the filesystem

pub mod prerelease;
pub mod tag;
pub mod transition;
pub mod version;

pub use prerelease::{PreRelease, PreReleaseTag, DEFAULT_PRE_RELEASE_TAG};
pub use tag::ReleaseTag;
pub use transition::{compute_next, Mode};
pub use version::Version;
