//! Deploy Module
//!
//! Orchestrates the iterative deploy flow.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`)
//! - `result` - Result types (`SetupOutcome`, `DeployOutcome`)
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use fleek_iterative_deploy::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(git, api, builder, files, clock);
//! let outcome = use_case.deploy_iteratively(&DeployOptions::new(root, site_id))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{
    DeployOptions, DEFAULT_BUILD_COMMAND, DEFAULT_DEPLOY_BRANCH, DEFAULT_GIT_USER_EMAIL,
    DEFAULT_GIT_USER_NAME, DEFAULT_PUBLIC_DIR, DEFAULT_REMOTE, HOLDING_DIR,
};
pub use result::{DeployOutcome, SetupOutcome};
pub use use_case::{DeployUseCase, DEPLOY_BRANCH_README};

#[cfg(test)]
mod tests;
