//! Local File System Implementation
//!
//! Implements the BuildFiles port for local disk operations.

use crate::domain::ports::{BuildFiles, FsError, FsResult};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Local file system implementation
///
/// Directory walks use `ignore` with every filter disabled: build output is
/// usually git-ignored and may contain dotfiles, and all of it must be deployed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBuildFiles;

impl LocalBuildFiles {
    /// Create a new LocalBuildFiles instance
    pub fn new() -> Self {
        Self
    }

    fn walk(dir: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder
    }
}

fn copy_file(from: &Path, to: &Path) -> FsResult<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
    }
    std::fs::copy(from, to).map_err(|e| FsError::at(from, e))?;
    Ok(())
}

impl BuildFiles for LocalBuildFiles {
    fn list_files_recursive(&self, dir: &Path) -> FsResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(FsError::NotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in Self::walk(dir).build() {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            if entry.file_type().is_some_and(|t| !t.is_dir()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn file_size(&self, path: &Path) -> FsResult<u64> {
        std::fs::metadata(path)
            .map(|meta| meta.len())
            .map_err(|e| FsError::at(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn entry_count(&self, dir: &Path) -> FsResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| FsError::at(dir, e))?;
        Ok(entries.filter(Result::is_ok).count())
    }

    fn clear_dir(&self, dir: &Path) -> FsResult<()> {
        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|e| FsError::at(dir, e))?;
        }
        std::fs::create_dir_all(dir).map_err(|e| FsError::at(dir, e))
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> FsResult<()> {
        if !from.is_dir() {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        std::fs::create_dir_all(to).map_err(|e| FsError::at(to, e))?;

        for entry in Self::walk(from).build() {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|_| FsError::OutsideRoot {
                    path: entry.path().to_path_buf(),
                    root: from.to_path_buf(),
                })?;
            let target = to.join(relative);

            match entry.file_type() {
                Some(t) if t.is_dir() => {
                    std::fs::create_dir_all(&target).map_err(|e| FsError::at(&target, e))?
                }
                _ => copy_file(entry.path(), &target)?,
            }
        }
        Ok(())
    }

    fn copy_files_to_dir(
        &self,
        files: &[PathBuf],
        structure_root: &Path,
        to_dir: &Path,
    ) -> FsResult<Vec<PathBuf>> {
        let mut copied = Vec::with_capacity(files.len());
        for file in files {
            if file.is_dir() {
                continue;
            }
            let relative = file
                .strip_prefix(structure_root)
                .map_err(|_| FsError::OutsideRoot {
                    path: file.clone(),
                    root: structure_root.to_path_buf(),
                })?;
            let target = to_dir.join(relative);
            copy_file(file, &target)?;
            copied.push(target);
        }
        Ok(copied)
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| FsError::at(path, e))
    }

    fn remove_match_from_file(&self, path: &Path, needle: &str) -> FsResult<bool> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(FsError::at(path, e)),
        };
        if needle.is_empty() {
            return Ok(false);
        }

        // Prefer dropping a whole matching line so neighbouring entries stay intact
        let mut removed_line = false;
        let kept: Vec<&str> = content
            .split_inclusive('\n')
            .filter(|line| {
                if !removed_line && line.trim() == needle {
                    removed_line = true;
                    return false;
                }
                true
            })
            .collect();

        let updated = if removed_line {
            kept.concat()
        } else if content.contains(needle) {
            content.replacen(needle, "", 1)
        } else {
            return Ok(false);
        };

        std::fs::write(path, updated).map_err(|e| FsError::at(path, e))?;
        Ok(true)
    }
}
