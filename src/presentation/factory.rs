//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use crate::application::DeployUseCase;
use crate::domain::ports::{DeployApiError, DeployEventSink};
use crate::infrastructure::{
    ConsoleEventSink, FleekClient, FleekClientConfig, JsonEventSink, LocalBuildFiles,
    ShellBuildRunner, ShellGit, SystemClock,
};
use std::path::Path;
use std::sync::Arc;

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase =
    DeployUseCase<ShellGit, FleekClient, ShellBuildRunner, LocalBuildFiles, SystemClock>;

/// Event sink for the selected output mode
pub fn create_event_sink(json: bool, verbose: u8) -> Arc<dyn DeployEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::new(verbose))
    }
}

/// Create a deploy use case operating on the checkout at `root`
pub fn create_deploy_use_case(
    root: &Path,
    api: FleekClientConfig,
    events: Arc<dyn DeployEventSink>,
) -> Result<ConcreteDeployUseCase, DeployApiError> {
    let client = FleekClient::new(api)?;

    Ok(DeployUseCase::new(
        ShellGit::new(root),
        client,
        ShellBuildRunner::new(),
        LocalBuildFiles::new(),
        SystemClock,
    )
    .with_event_sink(events))
}
