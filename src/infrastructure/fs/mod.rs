//! File System Implementations
//!
//! Concrete implementation of the BuildFiles port.

mod local;

pub use local::LocalBuildFiles;
