//! Workflow layer shared by the binary and library callers

pub mod orchestration;

pub use orchestration::{
    default_comment, run, run_with_options, DirectoryReport, Orchestrator, Outcome, RunOptions,
    RunReport, Step, StepRecord, StepResult,
};
