//! Git via the `git` binary
//!
//! Every operation spawns `git -C <root> ...` with an argument vector, so
//! branch names and commit messages never pass through a shell.

use crate::domain::entities::{parse_porcelain_z, ChangeRecord};
use crate::domain::ports::{
    CherryPickOptions, CommitOptions, DeleteBranchOptions, GitError, GitRepository, GitResult,
};
use crate::domain::value_objects::BranchScope;
use crate::infrastructure::shell::quote_command;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// GitRepository backed by the `git` command line
#[derive(Debug, Clone)]
pub struct ShellGit {
    root: PathBuf,
}

impl ShellGit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn describe(args: &[&str]) -> String {
        quote_command("git", args)
    }

    fn output(&self, args: &[&str], env: &[(&str, &str)]) -> GitResult<Output> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        cmd.output().map_err(|source| GitError::Spawn {
            command: Self::describe(args),
            source,
        })
    }

    fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> GitResult<String> {
        let output = self.output(args, env)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: Self::describe(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run(&self, args: &[&str]) -> GitResult<String> {
        self.run_with_env(args, &[])
    }

    fn list_refs(&self, pattern: &str) -> GitResult<Vec<String>> {
        let output = self.run(&["for-each-ref", "--format=%(refname:short)", pattern])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }
}

fn is_symbolic_remote_head(name: &str, remote: &str) -> bool {
    name == remote || name.ends_with("/HEAD")
}

impl GitRepository for ShellGit {
    fn list_branches(&self, scope: &BranchScope) -> GitResult<Vec<String>> {
        let mut branches = Vec::new();
        if scope.includes_local() {
            branches.extend(self.list_refs(&BranchScope::Local.ref_pattern())?);
        }
        if let Some(remote) = scope.remote() {
            let pattern = BranchScope::Remote(remote.to_string()).ref_pattern();
            branches.extend(
                self.list_refs(&pattern)?
                    .into_iter()
                    .filter(|name| !is_symbolic_remote_head(name, remote)),
            );
        }
        Ok(branches)
    }

    fn current_branch(&self) -> GitResult<Option<String>> {
        let args = ["symbolic-ref", "-q", "--short", "HEAD"];
        let output = self.output(&args, &[])?;
        match output.status.code() {
            Some(0) => {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(name).filter(|n| !n.is_empty()))
            }
            // Detached HEAD
            Some(1) => Ok(None),
            code => Err(GitError::CommandFailed {
                command: Self::describe(&args),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }

    fn checkout(&self, branch: &str) -> GitResult<()> {
        self.run(&["checkout", branch]).map(drop)
    }

    fn create_branch(&self, name: &str) -> GitResult<()> {
        self.run(&["branch", name]).map(drop)
    }

    fn create_branch_from(&self, name: &str, start_point: &str) -> GitResult<()> {
        self.run(&["branch", name, start_point]).map(drop)
    }

    fn delete_branch(&self, name: &str, options: &DeleteBranchOptions) -> GitResult<()> {
        if options.scope.includes_local() {
            let flag = if options.force { "-D" } else { "-d" };
            self.run(&["branch", flag, name])?;
        }
        if let Some(remote) = options.scope.remote() {
            self.run(&["push", remote, "--delete", name])?;
        }
        Ok(())
    }

    fn hard_reset(&self, reference: &str) -> GitResult<()> {
        self.run(&["reset", "--hard", reference, "--"]).map(drop)
    }

    fn fetch(&self, remote: &str, reference: &str) -> GitResult<()> {
        self.run(&["fetch", remote, reference]).map(drop)
    }

    fn update_all_from_remote(&self) -> GitResult<()> {
        self.run(&["fetch", "--all", "--prune"]).map(drop)
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> GitResult<()> {
        let refspec = format!("{}:{}", branch, branch);
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend(["-u", remote, refspec.as_str()]);
        self.run(&args).map(drop)
    }

    fn stage_all(&self) -> GitResult<()> {
        self.run(&["add", "-A"]).map(drop)
    }

    fn commit(&self, options: &CommitOptions) -> GitResult<String> {
        let mut args = vec!["commit"];
        if options.amend {
            args.push("--amend");
            // Both flags are rejected by git without --amend
            if options.no_edit {
                args.push("--no-edit");
            }
            if options.reset_author {
                args.push("--reset-author");
            }
        }
        if options.allow_empty {
            args.push("--allow-empty");
        }
        if let Some(message) = &options.message {
            args.extend(["-m", message.as_str()]);
        } else if !options.no_edit {
            return Err(GitError::UnexpectedOutput {
                command: Self::describe(&args),
                message: "commit needs a message unless amending with --no-edit".to_string(),
            });
        }

        self.run(&args)?;
        self.head_commit_hash()
    }

    fn status(&self) -> GitResult<Vec<ChangeRecord>> {
        let args = ["status", "--porcelain=v1", "-z", "--untracked-files=all"];
        let output = self.run(&args)?;
        parse_porcelain_z(&output).map_err(|e| GitError::UnexpectedOutput {
            command: Self::describe(&args),
            message: e.to_string(),
        })
    }

    fn head_commit_hash(&self) -> GitResult<String> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn commit_message(&self, reference: &str) -> GitResult<String> {
        Ok(self
            .run(&["log", "-1", "--format=%B", reference, "--"])?
            .trim_end()
            .to_string())
    }

    fn commit_difference(&self, on: &str, not_on: &str) -> GitResult<Vec<String>> {
        let exclude = format!("^{}", not_on);
        let output = self.run(&["rev-list", on, exclude.as_str(), "--"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn cherry_pick(&self, hash: &str, options: &CherryPickOptions) -> GitResult<()> {
        let committer_date = if options.preserve_committer_date && !options.stage_only {
            Some(self.run(&["log", "-1", "--format=%cI", hash, "--"])?.trim().to_string())
        } else {
            None
        };

        let mut args = vec!["cherry-pick"];
        if options.prefer_theirs {
            args.push("--strategy-option=theirs");
        }
        if options.stage_only {
            args.push("--no-commit");
        } else if options.allow_empty {
            args.extend(["--allow-empty", "--keep-redundant-commits"]);
        }
        args.push(hash);

        let env: Vec<(&str, &str)> = committer_date
            .as_deref()
            .map(|date| vec![("GIT_COMMITTER_DATE", date)])
            .unwrap_or_default();

        match self.run_with_env(&args, &env) {
            Ok(_) => Ok(()),
            // Leave the checkout usable for the rollback that follows
            Err(err) => match self.run(&["cherry-pick", "--abort"]) {
                Ok(_) => Err(err),
                Err(cleanup) => Err(GitError::CleanupFailed {
                    error: Box::new(err),
                    cleanup: Box::new(cleanup),
                }),
            },
        }
    }

    fn last_commits(&self, count: usize) -> GitResult<Vec<String>> {
        let limit = count.to_string();
        let output = self.run(&["log", "-n", limit.as_str(), "--format=%H"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn set_config(&self, key: &str, value: &str) -> GitResult<()> {
        self.run(&["config", key, value]).map(drop)
    }
}
