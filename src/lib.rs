//! verbump - pre-release bookkeeping for npm-style packages
//!
//! Reads the `version` of each configured project's `package.json`, advances
//! or finalizes it, then commits, tags (on release), pushes and publishes.
//!
//! ```no_run
//! use verbump::{Mode, ReleaseConfig};
//!
//! let report = verbump::run(Mode::Advance, Some("nightly"), ReleaseConfig::default(), None)?;
//! for dir in &report.directories {
//!     println!("{}: {:?}", dir.directory.display(), dir.outcome);
//! }
//! # Ok::<(), verbump::BumpError>(())
//! ```

pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod git;
pub mod manifest;
pub mod ui;

pub use cli::{run, run_with_options, Orchestrator, Outcome, RunOptions, RunReport};
pub use config::{load_config, ConfigSource, ReleaseConfig};
pub use domain::{Mode, Version};
pub use error::{BumpError, Result};
