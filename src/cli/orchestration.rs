//! Release workflow orchestration
//!
//! Project directories are processed one at a time, in configured order.
//! For each directory the chain is
//!
//! probe status -> compute next version -> write manifest -> commit
//! -> tag (release only) -> push -> publish
//!
//! A directory without a repository stops the whole run. Every other problem
//! is confined to its directory and the loop moves on.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, error, info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::{ConfigSource, ReleaseConfig};
use crate::domain::{compute_next, Mode, PreReleaseTag, ReleaseTag, Version};
use crate::error::{BumpError, Result};
use crate::exec::{CommandRunner, Invocation, SystemRunner};
use crate::git::{Git2Repository, RepoStatus, StatusProbe};
use crate::manifest::ManifestDocument;

/// Per-invocation options layered over the configuration
///
/// Decoupled from clap so the workflow can be called programmatically.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub mode: Mode,

    /// Commit message; a dated default is generated when `None`
    pub comment: Option<String>,

    /// Overrides `preReleaseTag` from the configuration
    pub pre_release_tag: Option<String>,

    /// Overrides `doPublish` from the configuration
    pub publish: Option<bool>,

    /// Compute and report, but change nothing
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(mode: Mode) -> Self {
        RunOptions {
            mode,
            comment: None,
            pre_release_tag: None,
            publish: None,
            dry_run: false,
        }
    }
}

/// External steps run after the manifest is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Commit,
    Tag,
    Push,
    Publish,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Commit => write!(f, "commit"),
            Step::Tag => write!(f, "tag"),
            Step::Push => write!(f, "push"),
            Step::Publish => write!(f, "publish"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Done,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: Step,
    pub result: StepResult,
}

/// How processing of one directory ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not under version control; the run stopped here
    NoRepository,
    /// No modifications in bump mode
    Clean,
    /// Release requested but the version is already final and nothing changed
    Unchanged,
    /// Stored pre-release tag differs from the configured tag
    TagMismatch { found: String, expected: String },
    /// Probe, manifest or write failure; nothing external was run
    Halted(String),
    /// Dry run: the version was computed but nothing was written
    Planned,
    /// Manifest written and external steps attempted; see the step records
    Processed,
}

/// Everything that happened to one project directory
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub status: Option<RepoStatus>,
    pub previous_version: Option<String>,
    pub next_version: Option<String>,
    pub release_tag: Option<String>,
    pub outcome: Outcome,
    pub steps: Vec<StepRecord>,
    pub warnings: Vec<BoundaryWarning>,
}

impl DirectoryReport {
    fn new(directory: &Path) -> Self {
        DirectoryReport {
            directory: directory.to_path_buf(),
            status: None,
            previous_version: None,
            next_version: None,
            release_tag: None,
            outcome: Outcome::Processed,
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Result of `step`, if the chain got that far
    pub fn step(&self, step: Step) -> Option<&StepResult> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.result)
    }

    /// True unless the directory halted or one of its steps failed
    pub fn succeeded(&self) -> bool {
        match self.outcome {
            Outcome::NoRepository | Outcome::Halted(_) | Outcome::TagMismatch { .. } => false,
            _ => !self
                .steps
                .iter()
                .any(|record| matches!(record.result, StepResult::Failed(_))),
        }
    }

    fn record(&mut self, step: Step, result: StepResult) {
        self.steps.push(StepRecord { step, result });
    }

    fn halt(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        error!("{}: {}", self.directory.display(), reason);
        self.warnings.push(BoundaryWarning::Halted {
            directory: self.directory.clone(),
            reason: reason.clone(),
        });
        self.outcome = Outcome::Halted(reason);
        self
    }
}

/// Outcome of a whole run, one entry per visited directory
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub directories: Vec<DirectoryReport>,
}

impl RunReport {
    /// Whether the run stopped early on a directory without a repository
    pub fn halted(&self) -> bool {
        self.directories
            .iter()
            .any(|d| d.outcome == Outcome::NoRepository)
    }

    /// Process exit code: 3 when halted on a missing repository, else 0
    pub fn exit_code(&self) -> i32 {
        if self.halted() {
            3
        } else {
            0
        }
    }

    pub fn directory(&self, directory: &Path) -> Option<&DirectoryReport> {
        self.directories.iter().find(|d| d.directory == directory)
    }
}

/// Settings fixed for the duration of one run
struct RunContext {
    mode: Mode,
    tag: PreReleaseTag,
    comment: String,
    publish: bool,
    publish_command: Vec<String>,
    remote: String,
    dry_run: bool,
}

/// Default commit message: a dated marker for unattended bumps
pub fn default_comment() -> String {
    format!("version bump {}", Local::now().format("%Y-%m-%d %H:%M"))
}

/// Drives the per-directory release chain
pub struct Orchestrator<P, R> {
    probe: P,
    runner: R,
}

impl Orchestrator<Git2Repository, SystemRunner> {
    /// Orchestrator using libgit2 for status and real child processes
    pub fn system() -> Self {
        Orchestrator::new(Git2Repository::new(), SystemRunner)
    }
}

impl<P: StatusProbe, R: CommandRunner> Orchestrator<P, R> {
    pub fn new(probe: P, runner: R) -> Self {
        Orchestrator { probe, runner }
    }

    /// Run the workflow over every configured directory.
    ///
    /// # Returns
    /// * `Ok(RunReport)` - per-directory outcomes, including a run that
    ///   stopped at a directory without a repository
    /// * `Err(BumpError::Config)` - invalid configuration or tag
    /// * `Err(BumpError::MissingDirectory)` - a configured directory does not
    ///   exist; checked before any directory is touched
    pub fn run(&self, config: &ReleaseConfig, options: &RunOptions) -> Result<RunReport> {
        let publish = options.publish.unwrap_or(config.do_publish);
        config.validate(publish)?;

        let tag = PreReleaseTag::parse(
            options
                .pre_release_tag
                .as_deref()
                .unwrap_or(config.pre_release_tag.as_str()),
        )?;

        let directories = config.resolved_dirs();
        if let Some(missing) = directories.iter().find(|dir| !dir.is_dir()) {
            error!("project directory {} does not exist", missing.display());
            return Err(BumpError::MissingDirectory(missing.clone()));
        }

        let ctx = RunContext {
            mode: options.mode,
            tag,
            comment: options.comment.clone().unwrap_or_else(default_comment),
            publish,
            publish_command: config.publish_command.clone(),
            remote: config.remote.clone(),
            dry_run: options.dry_run,
        };

        info!(
            "{} {} director{} with pre-release tag '{}'",
            if ctx.dry_run { "planning" } else { "running" },
            directories.len(),
            if directories.len() == 1 { "y" } else { "ies" },
            ctx.tag
        );

        let mut report = RunReport {
            mode: ctx.mode,
            dry_run: ctx.dry_run,
            directories: Vec::with_capacity(directories.len()),
        };

        for directory in &directories {
            let entry = self.process_directory(&ctx, directory);
            let stop = entry.outcome == Outcome::NoRepository;
            report.directories.push(entry);
            if stop {
                error!("stopping: {} is not under version control", directory.display());
                break;
            }
        }

        Ok(report)
    }

    fn process_directory(&self, ctx: &RunContext, directory: &Path) -> DirectoryReport {
        info!("processing {}", directory.display());
        let mut report = DirectoryReport::new(directory);

        let status = match self.probe.status(directory) {
            Ok(status) => status,
            Err(e) => return report.halt(format!("status check failed: {}", e)),
        };
        report.status = Some(status);
        debug!("{}: repository is {}", directory.display(), status);

        match status {
            RepoStatus::NoRepository => {
                error!("{}: no repository", directory.display());
                report.outcome = Outcome::NoRepository;
                return report;
            }
            RepoStatus::Clean if ctx.mode == Mode::Advance => {
                let warning = BoundaryWarning::NothingToCommit {
                    directory: directory.to_path_buf(),
                };
                info!("{}", warning);
                report.warnings.push(warning);
                report.outcome = Outcome::Clean;
                return report;
            }
            _ => {}
        }

        let mut manifest = match ManifestDocument::read(directory) {
            Ok(manifest) => manifest,
            Err(e) => return report.halt(e.to_string()),
        };

        let Some(raw) = manifest.version().map(str::to_string) else {
            let err = BumpError::MissingVersion(manifest.path().display().to_string());
            return report.halt(err.to_string());
        };
        report.previous_version = Some(raw.clone());

        let next = match compute_next(Some(raw.as_str()), ctx.mode, &ctx.tag) {
            Ok(next) => next,
            Err(BumpError::TagMismatch { found, expected }) => {
                let warning = BoundaryWarning::TagMismatch {
                    directory: directory.to_path_buf(),
                    found: found.clone(),
                    expected: expected.clone(),
                };
                warn!("{}", warning);
                report.warnings.push(warning);
                report.outcome = Outcome::TagMismatch { found, expected };
                return report;
            }
            Err(e) => return report.halt(e.to_string()),
        };
        report.next_version = Some(next.to_string());

        let changed = next.to_string() != raw;
        if !changed && status == RepoStatus::Clean {
            let warning = BoundaryWarning::AlreadyReleased {
                directory: directory.to_path_buf(),
                version: raw,
            };
            info!("{}", warning);
            report.warnings.push(warning);
            report.outcome = Outcome::Unchanged;
            return report;
        }

        let release_tag = (ctx.mode == Mode::Finalize).then(|| ReleaseTag::for_version(&next));
        report.release_tag = release_tag.as_ref().map(ToString::to_string);

        if ctx.dry_run {
            info!(
                "{}: would change version {} -> {}{}",
                directory.display(),
                raw,
                next,
                release_tag
                    .as_ref()
                    .map(|t| format!(", tag {}", t))
                    .unwrap_or_default()
            );
            report.outcome = Outcome::Planned;
            return report;
        }

        if changed {
            manifest.set_version(&next);
            if let Err(e) = manifest.write() {
                return report.halt(format!("failed to write manifest: {}", e));
            }
            info!("{}: version {} -> {}", directory.display(), raw, next);
        }

        self.run_steps(ctx, directory, &next, release_tag.as_ref(), &mut report);
        report.outcome = Outcome::Processed;
        report
    }

    /// Commit, tag, push and publish, recording each step.
    ///
    /// Tag, push and publish require a successful commit. Push does not
    /// require a successful tag; only a created tag is pushed.
    fn run_steps(
        &self,
        ctx: &RunContext,
        directory: &Path,
        version: &Version,
        release_tag: Option<&ReleaseTag>,
        report: &mut DirectoryReport,
    ) {
        let commit =
            Invocation::git(directory).args(["commit", "-m", ctx.comment.as_str(), "--", "."]);
        if !self.attempt(Step::Commit, &commit, report) {
            report.record(Step::Tag, StepResult::Skipped);
            report.record(Step::Push, StepResult::Skipped);
            report.record(Step::Publish, StepResult::Skipped);
            return;
        }

        let tagged = match release_tag {
            Some(tag) => {
                let invocation = Invocation::git(directory).args(["tag", tag.as_str()]);
                self.attempt(Step::Tag, &invocation, report)
            }
            None => {
                report.record(Step::Tag, StepResult::Skipped);
                false
            }
        };

        let mut pushes = vec![Invocation::git(directory).arg("push")];
        if let (true, Some(tag)) = (tagged, release_tag) {
            pushes.push(
                Invocation::git(directory).args(["push", ctx.remote.as_str(), tag.as_str()]),
            );
        }
        self.attempt_all(Step::Push, &pushes, report);

        if !ctx.publish {
            debug!("{}: publishing disabled", directory.display());
            report.record(Step::Publish, StepResult::Skipped);
        } else if let Some((program, args)) = ctx.publish_command.split_first() {
            let invocation =
                Invocation::new(program.as_str(), directory).args(args.iter().cloned());
            if self.attempt(Step::Publish, &invocation, report) {
                info!("{}: published {}", directory.display(), version);
            }
        } else {
            self.fail(Step::Publish, "no publish command configured".to_string(), report);
        }
    }

    fn attempt(&self, step: Step, invocation: &Invocation, report: &mut DirectoryReport) -> bool {
        self.attempt_all(step, std::slice::from_ref(invocation), report)
    }

    /// Run invocations in order, stopping at the first failure
    fn attempt_all(
        &self,
        step: Step,
        invocations: &[Invocation],
        report: &mut DirectoryReport,
    ) -> bool {
        for invocation in invocations {
            debug!("{}: {} `{}`", report.directory.display(), step, invocation);
            if let Err(e) = self.runner.run(invocation) {
                self.fail(step, e.to_string(), report);
                return false;
            }
        }
        info!("{}: {} done", report.directory.display(), step);
        report.record(step, StepResult::Done);
        true
    }

    fn fail(&self, step: Step, reason: String, report: &mut DirectoryReport) {
        let warning = BoundaryWarning::StepFailed {
            directory: report.directory.clone(),
            step: step.to_string(),
            reason: reason.clone(),
        };
        warn!("{}", warning);
        report.warnings.push(warning);
        report.record(step, StepResult::Failed(reason));
    }
}

/// Programmatic entry point using git and real child processes.
///
/// # Arguments
/// * `mode` - advance the pre-release or finalize a release
/// * `comment` - commit message; `None` generates a dated one
/// * `config` - a config path or a ready [ReleaseConfig]
/// * `pre_release_tag` - overrides the configured tag
pub fn run(
    mode: Mode,
    comment: Option<&str>,
    config: impl Into<ConfigSource>,
    pre_release_tag: Option<&str>,
) -> Result<RunReport> {
    let options = RunOptions {
        comment: comment.map(str::to_string),
        pre_release_tag: pre_release_tag.map(str::to_string),
        ..RunOptions::new(mode)
    };
    run_with_options(config.into(), &options)
}

/// Like [run], with every per-invocation option available
pub fn run_with_options(source: ConfigSource, options: &RunOptions) -> Result<RunReport> {
    let config = source.load()?;
    Orchestrator::system().run(&config, options)
}
