//! Git Implementations
//!
//! Concrete implementation of the GitRepository port.

mod shell_git;

pub use shell_git::ShellGit;
