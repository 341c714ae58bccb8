//! Application Layer
//!
//! Use cases that orchestrate the deploy flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Setup, chunked upload and rollback of an iterative deploy
//! - `HistoryReplayer` - Collapses previous full-build commits onto the trigger tip
//! - `DeployPoller` - Waits for remote deploys to start and finish

pub mod deploy;
pub mod poller;
pub mod replay;

pub use deploy::{DeployOptions, DeployOutcome, DeployUseCase, SetupOutcome};
pub use poller::{DeployPoller, PollSettings};
pub use replay::{HistoryReplayer, ReplayOutcome};
