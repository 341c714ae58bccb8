//! BuildFiles port - file operations on build output
//!
//! Lets the deploy flow move build output between the public directory and
//! the holding directory without depending on a concrete file system.

use std::path::{Path, PathBuf};

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Permission denied
    PermissionDenied(PathBuf),
    /// A file that should be copied lies outside the directory whose structure is kept
    OutsideRoot { path: PathBuf, root: PathBuf },
    /// I/O error
    Io(std::io::Error),
    /// Other error
    Other(String),
}

impl FsError {
    /// Attach the offending path to an I/O error
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(PathBuf::new()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(PathBuf::new()),
            _ => FsError::Io(err),
        }
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            FsError::OutsideRoot { path, root } => write!(
                f,
                "File {} is outside of {}",
                path.display(),
                root.display()
            ),
            FsError::Io(err) => write!(f, "I/O error: {}", err),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

/// File operations the deploy flow performs on build output
///
/// Implementations:
/// - `LocalBuildFiles` - standard file I/O
pub trait BuildFiles {
    /// Every file below `dir` (directories excluded), sorted, each joined onto `dir`
    fn list_files_recursive(&self, dir: &Path) -> FsResult<Vec<PathBuf>>;

    /// Size of a file in bytes
    fn file_size(&self, path: &Path) -> FsResult<u64>;

    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Number of direct entries in a directory
    fn entry_count(&self, dir: &Path) -> FsResult<usize>;

    /// Remove a directory with all its contents and recreate it empty
    fn clear_dir(&self, dir: &Path) -> FsResult<()>;

    /// Recursively copy the contents of `from` into `to`
    fn copy_dir(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Copy `files` into `to_dir`, keeping each file's path relative to
    /// `structure_root`. Directories in `files` are skipped. Returns the new paths.
    fn copy_files_to_dir(
        &self,
        files: &[PathBuf],
        structure_root: &Path,
        to_dir: &Path,
    ) -> FsResult<Vec<PathBuf>>;

    /// Write content to a file, creating parent directories
    fn write(&self, path: &Path, content: &str) -> FsResult<()>;

    /// Remove the first occurrence of `needle` from a text file.
    /// Returns true if the file was modified.
    fn remove_match_from_file(&self, path: &Path, needle: &str) -> FsResult<bool>;
}
