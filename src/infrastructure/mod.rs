//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `git/` - GitRepository via the `git` binary
//! - `fleek/` - DeployStatusApi via the Fleek GraphQL API
//! - `build/` - BuildRunner via the platform shell
//! - `fs/` - BuildFiles on the local disk
//! - `events/` - Console and NDJSON event sinks
//! - `shell/` - Command-line quoting

pub mod build;
pub mod clock;
pub mod events;
pub mod fleek;
pub mod fs;
pub mod git;
pub mod shell;

// Re-export for convenience
pub use build::ShellBuildRunner;
pub use clock::SystemClock;
pub use events::{ConsoleEventSink, JsonEventSink};
pub use fleek::{FleekClient, FleekClientConfig, DEFAULT_API_URL};
pub use fs::LocalBuildFiles;
pub use git::ShellGit;
