use crate::error::{BumpError, Result};
use crate::exec::{CommandOutput, CommandRunner, Invocation};
use std::sync::Mutex;

type FailRule = Box<dyn Fn(&Invocation) -> bool + Send + Sync>;

/// Runner that records invocations instead of executing them
///
/// Invocations matching a rule added with [RecordingRunner::fail_when] fail
/// with an [BumpError::ExternalCommand] error; all others succeed.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_rules: Vec<FailRule>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_when(mut self, rule: impl Fn(&Invocation) -> bool + Send + Sync + 'static) -> Self {
        self.fail_rules.push(Box::new(rule));
        self
    }

    /// Everything run so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Recorded command lines, e.g. `git tag v1.0.0`
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        if self.fail_rules.iter().any(|rule| rule(invocation)) {
            return Err(BumpError::external(invocation.to_string(), "simulated failure"));
        }
        Ok(CommandOutput::default())
    }
}
