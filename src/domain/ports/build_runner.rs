//! Build Runner Port
//!
//! Runs the opaque static-site build command.

use crate::domain::ports::DeployEventSink;
use std::path::Path;

/// Outcome of a build command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Everything the command wrote to stderr
    pub stderr: String,
}

impl BuildOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a build command to completion, streaming its output as
/// `DeployEvent::BuildOutput` events
pub trait BuildRunner {
    fn run(
        &self,
        command: &str,
        cwd: &Path,
        events: &dyn DeployEventSink,
    ) -> std::io::Result<BuildOutput>;
}
