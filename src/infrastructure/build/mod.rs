//! Build Runner Implementations

mod shell_build;

pub use shell_build::ShellBuildRunner;
