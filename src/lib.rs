//! fleek-iterative-deploy - deploy large static sites to Fleek in chunks
//!
//! Fleek rejects deploys above a size limit. This crate builds the site, works
//! out which build files changed since the previous deploy by replaying the
//! previous full-build commit onto the trigger branch, and pushes the changed
//! files to a deploy branch in several commits, waiting for each remote deploy
//! to finish before pushing the next.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{DeployOptions, DeployOutcome, DeployUseCase, SetupOutcome};
pub use config::Config;
pub use error::{FleekDeployError, FleekDeployResult};
