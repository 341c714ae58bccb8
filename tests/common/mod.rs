//! Shared fixtures for integration tests that drive a real `git`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// A working clone plus the bare repository it pushes to (`origin`)
pub struct GitFixture {
    _dir: TempDir,
    pub work: PathBuf,
    pub remote: PathBuf,
}

impl GitFixture {
    /// Working tree on `main` with one initial commit already pushed
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let remote = dir.path().join("remote.git");
        fs::create_dir_all(&work).unwrap();

        run_git(dir.path(), &["init", "-q", "--bare", "remote.git"]);

        let fixture = Self {
            _dir: dir,
            work,
            remote,
        };
        fixture.git(&["init", "-q"]);
        fixture.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        fixture.git(&["config", "user.name", "Fixture"]);
        fixture.git(&["config", "user.email", "fixture@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        let remote_path = fixture.remote.to_string_lossy().into_owned();
        fixture.git(&["remote", "add", "origin", &remote_path]);

        fixture.commit_file("README.md", "site\n", "initial commit");
        fixture.git(&["push", "-q", "-u", "origin", "main"]);
        fixture
    }

    /// Run git in the working tree and return trimmed stdout
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.work, args)
    }

    pub fn write(&self, path: &str, contents: &str) {
        let path = self.work.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    /// Write, stage and commit a single file; returns the new HEAD hash
    pub fn commit_file(&self, path: &str, contents: &str, message: &str) -> String {
        self.write(path, contents);
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Subjects of the commits reachable from `reference`, newest first
    pub fn subjects(&self, reference: &str) -> Vec<String> {
        self.git(&["log", "--format=%s", reference])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}
