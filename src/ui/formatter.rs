//! Pure formatting functions for UI output.
//!
//! `format_*` functions build strings and are unit tested; `display_*`
//! functions print them.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::{DirectoryReport, Outcome, RunReport, Step, StepResult};

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn format_boundary_warning(warning: &BoundaryWarning) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), warning)
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{}", format_boundary_warning(warning));
}

fn format_step(step: Step, result: &StepResult) -> Option<String> {
    match result {
        StepResult::Done => Some(format!("{} {}", style("✓").green(), step)),
        StepResult::Failed(_) => Some(format!("{} {}", style("✗").red(), step)),
        StepResult::Skipped => None,
    }
}

/// One summary line for a directory, e.g.
/// `packages/a  1.2.3 -> 1.2.4-pre-release.1  ✓ commit ✓ push`
pub fn format_directory_line(report: &DirectoryReport) -> String {
    let dir = report.directory.display();
    let versions = match (&report.previous_version, &report.next_version) {
        (Some(prev), Some(next)) if prev != next => format!("{} -> {}", prev, next),
        (Some(prev), _) => prev.clone(),
        _ => String::new(),
    };

    let detail = match &report.outcome {
        Outcome::NoRepository => style("no repository").red().to_string(),
        Outcome::Clean => style("nothing to commit").dim().to_string(),
        Outcome::Unchanged => style("already released").dim().to_string(),
        Outcome::TagMismatch { found, expected } => style(format!(
            "tag '{}' differs from '{}'",
            found, expected
        ))
        .yellow()
        .to_string(),
        Outcome::Halted(reason) => style(reason).red().to_string(),
        Outcome::Planned => match &report.release_tag {
            Some(tag) => format!("planned, tag {}", tag),
            None => "planned".to_string(),
        },
        Outcome::Processed => report
            .steps
            .iter()
            .filter_map(|record| format_step(record.step, &record.result))
            .collect::<Vec<_>>()
            .join(" "),
    };

    [dir.to_string(), versions, detail]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("  ")
}

/// Print the end-of-run summary
pub fn display_report(report: &RunReport) {
    let heading = if report.dry_run {
        format!("Dry run ({})", report.mode)
    } else {
        format!("Summary ({})", report.mode)
    };
    println!("\n{}", style(heading).bold());

    for dir in &report.directories {
        let marker = if dir.succeeded() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", marker, format_directory_line(dir));
    }

    for warning in report.directories.iter().flat_map(|dir| &dir.warnings) {
        display_boundary_warning(warning);
    }

    if report.halted() {
        display_error("run stopped at a directory without a repository");
    }
}
