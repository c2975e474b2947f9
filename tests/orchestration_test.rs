use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use verbump::boundary::BoundaryWarning;
use verbump::cli::{Orchestrator, Outcome, RunOptions, Step, StepResult};
use verbump::config::ReleaseConfig;
use verbump::domain::Mode;
use verbump::exec::{Invocation, RecordingRunner};
use verbump::git::{MockRepository, RepoStatus, StatusProbe};
use verbump::BumpError;

// ============================================================================
// Helpers
// ============================================================================

fn write_manifest(dir: &Path, version: &str) {
    fs::create_dir_all(dir).unwrap();
    let text = format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"{}\",\n  \"main\": \"index.js\"\n}}\n",
        dir.file_name().unwrap().to_string_lossy(),
        version
    );
    fs::write(dir.join("package.json"), text).unwrap();
}

fn manifest_version(dir: &Path) -> String {
    let text = fs::read_to_string(dir.join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["version"].as_str().unwrap().to_string()
}

fn config_for(root: &TempDir, dirs: &[&str]) -> ReleaseConfig {
    ReleaseConfig {
        project_dirs: dirs.iter().map(PathBuf::from).collect(),
        base_dir: root.path().to_path_buf(),
        ..ReleaseConfig::default()
    }
}

fn options(mode: Mode) -> RunOptions {
    RunOptions {
        comment: Some("bump".to_string()),
        ..RunOptions::new(mode)
    }
}

/// Probe whose status check always errors
struct FailingProbe;

impl StatusProbe for FailingProbe {
    fn status(&self, _directory: &Path) -> verbump::Result<RepoStatus> {
        Err(BumpError::Git(git2::Error::from_str("index is locked")))
    }
}

fn first_arg(inv: &Invocation) -> &str {
    inv.args.first().map(String::as_str).unwrap_or("")
}

// ============================================================================
// Version transitions through the whole chain
// ============================================================================

#[test]
fn test_bump_starts_pre_release_series() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.3");

    let runner = RecordingRunner::new();
    let orchestrator = Orchestrator::new(MockRepository::default(), &runner);
    let report = orchestrator
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(manifest_version(&pkg), "1.2.4-pre-release.1");
    let dir = &report.directories[0];
    assert_eq!(dir.outcome, Outcome::Processed);
    assert_eq!(dir.previous_version.as_deref(), Some("1.2.3"));
    assert_eq!(dir.next_version.as_deref(), Some("1.2.4-pre-release.1"));
    assert_eq!(dir.step(Step::Tag), Some(&StepResult::Skipped));
    assert!(dir.succeeded());

    assert_eq!(
        runner.command_lines(),
        vec!["git commit -m bump -- .", "git push", "npm publish"]
    );
    assert!(runner.calls().iter().all(|c| c.cwd == pkg));
}

#[test]
fn test_bump_continues_series() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.4-pre-release.1");

    let runner = RecordingRunner::new();
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(manifest_version(&pkg), "1.2.4-pre-release.2");
}

#[test]
fn test_release_finalizes_and_tags() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.4-pre-release.2");

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Finalize))
        .unwrap();

    assert_eq!(manifest_version(&pkg), "1.2.4");
    assert_eq!(report.directories[0].release_tag.as_deref(), Some("v1.2.4"));
    assert_eq!(
        runner.command_lines(),
        vec![
            "git commit -m bump -- .",
            "git tag v1.2.4",
            "git push",
            "git push origin v1.2.4",
            "npm publish",
        ]
    );
}

#[test]
fn test_tag_mismatch_leaves_manifest_untouched() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.4-alpha.1");
    let before = fs::read_to_string(pkg.join("package.json")).unwrap();

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(fs::read_to_string(pkg.join("package.json")).unwrap(), before);
    assert_eq!(
        report.directories[0].outcome,
        Outcome::TagMismatch {
            found: "alpha".to_string(),
            expected: "pre-release".to_string(),
        }
    );
    assert!(runner.calls().is_empty());
}

#[test]
fn test_tag_override_replaces_configured_tag() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.4-alpha.1");

    let runner = RecordingRunner::new();
    let opts = RunOptions {
        pre_release_tag: Some("alpha".to_string()),
        ..options(Mode::Advance)
    };
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &opts)
        .unwrap();

    assert_eq!(manifest_version(&pkg), "1.2.4-alpha.2");
}

#[test]
fn test_invalid_tag_override_is_rejected_before_processing() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let runner = RecordingRunner::new();
    let opts = RunOptions {
        pre_release_tag: Some("not valid".to_string()),
        ..options(Mode::Advance)
    };
    let err = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &opts)
        .unwrap_err();

    assert!(matches!(err, BumpError::Config(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(manifest_version(&pkg), "1.0.0");
}

// ============================================================================
// Multi-directory sequencing
// ============================================================================

#[test]
fn test_clean_directory_is_skipped_and_next_processed() {
    let root = TempDir::new().unwrap();
    let a = root.path().join("a");
    let b = root.path().join("b");
    write_manifest(&a, "1.0.0");
    write_manifest(&b, "2.0.0");

    let probe = MockRepository::default().with_status(a.clone(), RepoStatus::Clean);
    let runner = RecordingRunner::new();
    let report = Orchestrator::new(probe, &runner)
        .run(&config_for(&root, &["a", "b"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(report.directories.len(), 2);
    assert_eq!(report.directory(&a).unwrap().outcome, Outcome::Clean);
    assert_eq!(report.directory(&b).unwrap().outcome, Outcome::Processed);
    assert_eq!(manifest_version(&a), "1.0.0");
    assert_eq!(manifest_version(&b), "2.0.1-pre-release.1");
    assert!(runner.calls().iter().all(|c| c.cwd == b));
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_release_proceeds_on_clean_directory() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "0.3.0-pre-release.4");

    let probe = MockRepository::new(RepoStatus::Clean);
    let runner = RecordingRunner::new();
    let report = Orchestrator::new(probe, &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Finalize))
        .unwrap();

    assert_eq!(report.directories[0].outcome, Outcome::Processed);
    assert_eq!(manifest_version(&pkg), "0.3.0");
    assert!(runner.command_lines().contains(&"git tag v0.3.0".to_string()));
}

#[test]
fn test_release_of_final_version_on_clean_tree_is_unchanged() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "0.3.0");

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(MockRepository::new(RepoStatus::Clean), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Finalize))
        .unwrap();

    assert_eq!(report.directories[0].outcome, Outcome::Unchanged);
    assert!(runner.calls().is_empty());
}

#[test]
fn test_no_repository_stops_the_run() {
    let root = TempDir::new().unwrap();
    let a = root.path().join("a");
    let b = root.path().join("b");
    write_manifest(&a, "1.0.0");
    write_manifest(&b, "1.0.0");

    let probe = MockRepository::default().with_status(a.clone(), RepoStatus::NoRepository);
    let runner = RecordingRunner::new();
    let report = Orchestrator::new(probe, &runner)
        .run(&config_for(&root, &["a", "b"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(report.directories.len(), 1);
    assert_eq!(report.directories[0].outcome, Outcome::NoRepository);
    assert!(report.halted());
    assert_eq!(report.exit_code(), 3);
    assert_eq!(manifest_version(&b), "1.0.0");
    assert!(runner.calls().is_empty());
}

#[test]
fn test_directories_before_missing_repository_are_kept() {
    let root = TempDir::new().unwrap();
    let a = root.path().join("a");
    let b = root.path().join("b");
    write_manifest(&a, "1.0.0");
    write_manifest(&b, "1.0.0");

    let probe = MockRepository::default().with_status(b.clone(), RepoStatus::NoRepository);
    let runner = RecordingRunner::new();
    let report = Orchestrator::new(probe, &runner)
        .run(&config_for(&root, &["a", "b"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(report.directories.len(), 2);
    assert_eq!(manifest_version(&a), "1.0.1-pre-release.1");
    assert_eq!(report.exit_code(), 3);
}

#[test]
fn test_missing_directory_aborts_before_any_work() {
    let root = TempDir::new().unwrap();
    let a = root.path().join("a");
    write_manifest(&a, "1.0.0");

    let runner = RecordingRunner::new();
    let err = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["a", "missing"]), &options(Mode::Advance))
        .unwrap_err();

    assert!(matches!(err, BumpError::MissingDirectory(_)));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(manifest_version(&a), "1.0.0");
    assert!(runner.calls().is_empty());
}

#[test]
fn test_manifest_problems_halt_only_that_directory() {
    let root = TempDir::new().unwrap();
    let no_manifest = root.path().join("empty");
    let no_version = root.path().join("noversion");
    let broken = root.path().join("broken");
    let good = root.path().join("good");
    fs::create_dir_all(&no_manifest).unwrap();
    fs::create_dir_all(&no_version).unwrap();
    fs::write(no_version.join("package.json"), "{\n  \"name\": \"x\"\n}\n").unwrap();
    write_manifest(&broken, "1.x.0");
    write_manifest(&good, "4.0.0");

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(
            &config_for(&root, &["empty", "noversion", "broken", "good"]),
            &options(Mode::Advance),
        )
        .unwrap();

    for dir in [&no_manifest, &no_version, &broken] {
        let entry = report.directory(dir).unwrap();
        assert!(
            matches!(entry.outcome, Outcome::Halted(_)),
            "{} should halt, got {:?}",
            dir.display(),
            entry.outcome
        );
        assert!(!entry.warnings.is_empty());
    }
    assert_eq!(report.directory(&good).unwrap().outcome, Outcome::Processed);
    assert!(runner.calls().iter().all(|c| c.cwd == good));
}

#[test]
fn test_out_of_range_version_halts_only_that_directory() {
    let root = TempDir::new().unwrap();
    let huge = root.path().join("huge");
    let good = root.path().join("good");
    write_manifest(&huge, &format!("1.2.3-pre-release.{}", u64::MAX));
    write_manifest(&good, "1.0.0");

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["huge", "good"]), &options(Mode::Advance))
        .unwrap();

    assert!(matches!(
        report.directory(&huge).unwrap().outcome,
        Outcome::Halted(_)
    ));
    assert_eq!(
        manifest_version(&huge),
        format!("1.2.3-pre-release.{}", u64::MAX)
    );
    assert_eq!(report.directory(&good).unwrap().outcome, Outcome::Processed);
    assert!(runner.calls().iter().all(|c| c.cwd == good));
}

#[test]
fn test_status_check_error_halts_directory() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let runner = RecordingRunner::new();
    let report = Orchestrator::new(FailingProbe, &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    let entry = &report.directories[0];
    assert!(matches!(entry.outcome, Outcome::Halted(_)));
    assert!(matches!(
        entry.warnings.as_slice(),
        [BoundaryWarning::Halted { .. }]
    ));
    assert_eq!(report.exit_code(), 0);
    assert_eq!(manifest_version(&pkg), "1.0.0");
    assert!(runner.calls().is_empty());
}

// ============================================================================
// External step failures
// ============================================================================

#[test]
fn test_commit_failure_skips_remaining_steps_only_for_that_directory() {
    let root = TempDir::new().unwrap();
    let a = root.path().join("a");
    let b = root.path().join("b");
    write_manifest(&a, "1.0.0");
    write_manifest(&b, "1.0.0");

    let fail_a = a.clone();
    let runner = RecordingRunner::new()
        .fail_when(move |inv| inv.cwd == fail_a && first_arg(inv) == "commit");
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["a", "b"]), &options(Mode::Finalize))
        .unwrap();

    let entry = report.directory(&a).unwrap();
    assert!(matches!(entry.step(Step::Commit), Some(StepResult::Failed(_))));
    assert_eq!(entry.step(Step::Tag), Some(&StepResult::Skipped));
    assert_eq!(entry.step(Step::Push), Some(&StepResult::Skipped));
    assert_eq!(entry.step(Step::Publish), Some(&StepResult::Skipped));
    assert!(!entry.succeeded());

    let calls_in_a: Vec<_> = runner.calls().into_iter().filter(|c| c.cwd == a).collect();
    assert_eq!(calls_in_a.len(), 1);

    assert!(report.directory(&b).unwrap().succeeded());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_tag_failure_still_pushes_branch() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0-pre-release.1");

    let runner = RecordingRunner::new().fail_when(|inv| first_arg(inv) == "tag");
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Finalize))
        .unwrap();

    let entry = &report.directories[0];
    assert!(matches!(entry.step(Step::Tag), Some(StepResult::Failed(_))));
    assert_eq!(entry.step(Step::Push), Some(&StepResult::Done));
    assert_eq!(entry.step(Step::Publish), Some(&StepResult::Done));
    assert_eq!(
        runner.command_lines(),
        vec![
            "git commit -m bump -- .",
            "git tag v1.0.0",
            "git push",
            "npm publish",
        ]
    );
}

#[test]
fn test_push_failure_does_not_block_publish() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let runner = RecordingRunner::new().fail_when(|inv| first_arg(inv) == "push");
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    let entry = &report.directories[0];
    assert!(matches!(entry.step(Step::Push), Some(StepResult::Failed(_))));
    assert_eq!(entry.step(Step::Publish), Some(&StepResult::Done));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_publish_disabled_by_config_and_by_override() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let config = ReleaseConfig {
        do_publish: false,
        ..config_for(&root, &["pkg"])
    };
    let runner = RecordingRunner::new();
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config, &options(Mode::Advance))
        .unwrap();
    assert!(!runner.command_lines().iter().any(|l| l.starts_with("npm")));

    let runner = RecordingRunner::new();
    let opts = RunOptions {
        publish: Some(false),
        ..options(Mode::Advance)
    };
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &opts)
        .unwrap();
    assert_eq!(
        report.directories[0].step(Step::Publish),
        Some(&StepResult::Skipped)
    );
    assert!(!runner.command_lines().iter().any(|l| l.starts_with("npm")));
}

#[test]
fn test_empty_publish_command_needs_publishing_enabled() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let config = ReleaseConfig {
        publish_command: vec![],
        ..config_for(&root, &["pkg"])
    };

    let runner = RecordingRunner::new();
    let result = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config, &options(Mode::Advance));
    assert!(matches!(result, Err(BumpError::Config(_))));
    assert_eq!(manifest_version(&pkg), "1.0.0");

    let opts = RunOptions {
        publish: Some(false),
        ..options(Mode::Advance)
    };
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config, &opts)
        .unwrap();
    assert_eq!(
        report.directories[0].step(Step::Publish),
        Some(&StepResult::Skipped)
    );
}

#[test]
fn test_custom_publish_command() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let config = ReleaseConfig {
        publish_command: vec!["pnpm".into(), "publish".into(), "--no-git-checks".into()],
        ..config_for(&root, &["pkg"])
    };
    let runner = RecordingRunner::new();
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config, &options(Mode::Advance))
        .unwrap();

    assert_eq!(
        runner.command_lines().last().map(String::as_str),
        Some("pnpm publish --no-git-checks")
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.2.4-pre-release.2");

    let runner = RecordingRunner::new();
    let opts = RunOptions {
        dry_run: true,
        ..options(Mode::Finalize)
    };
    let report = Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &opts)
        .unwrap();

    let entry = &report.directories[0];
    assert_eq!(entry.outcome, Outcome::Planned);
    assert_eq!(entry.next_version.as_deref(), Some("1.2.4"));
    assert_eq!(entry.release_tag.as_deref(), Some("v1.2.4"));
    assert_eq!(manifest_version(&pkg), "1.2.4-pre-release.2");
    assert!(runner.calls().is_empty());
}

#[test]
fn test_default_comment_is_dated() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    write_manifest(&pkg, "1.0.0");

    let runner = RecordingRunner::new();
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &RunOptions::new(Mode::Advance))
        .unwrap();

    let commit = &runner.calls()[0];
    assert_eq!(first_arg(commit), "commit");
    let message = &commit.args[2];
    assert!(message.starts_with("version bump "), "got: {}", message);
    let year = chrono::Local::now().format("%Y").to_string();
    assert!(message.contains(&year));
}

#[test]
fn test_bump_preserves_manifest_formatting() {
    let root = TempDir::new().unwrap();
    let pkg = root.path().join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("package.json"),
        "{\n    \"name\": \"pkg\",\n    \"version\": \"1.2.3\",\n    \"scripts\": {\n        \"test\": \"jest\"\n    }\n}\n",
    )
    .unwrap();

    let runner = RecordingRunner::new();
    Orchestrator::new(MockRepository::default(), &runner)
        .run(&config_for(&root, &["pkg"]), &options(Mode::Advance))
        .unwrap();

    assert_eq!(
        fs::read_to_string(pkg.join("package.json")).unwrap(),
        "{\n    \"name\": \"pkg\",\n    \"version\": \"1.2.4-pre-release.1\",\n    \"scripts\": {\n        \"test\": \"jest\"\n    }\n}\n"
    );
}
