//! Console Event Sink
//!
//! Human-readable progress for people watching a CI log. Phase changes, branch
//! names, hashes, file counts and elapsed times are always shown; file lists,
//! commit diagnostics and poll attempts only with `-v`.

use crate::domain::ports::{
    BranchOrigin, DeployEvent, DeployEventSink, OutputStream, PollTarget,
};
use is_terminal::IsTerminal;
use std::io::{self, Write};
use std::sync::Mutex;

/// Where a rendered line goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Out,
    Err,
}

pub struct ConsoleEventSink {
    verbose: u8,
    unicode: bool,
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    /// Sink writing to stdout/stderr; icons only when stdout is a terminal
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            unicode: io::stdout().is_terminal(),
            out: Mutex::new(Box::new(io::stdout())),
            err: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Sink writing to custom writers (for testing)
    pub fn with_writers<O, E>(verbose: u8, out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            verbose,
            unicode: false,
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }

    fn icon(&self, unicode: &'static str, ascii: &'static str) -> &'static str {
        if self.unicode {
            unicode
        } else {
            ascii
        }
    }

    fn render(&self, event: &DeployEvent) -> Option<(Target, String)> {
        let detailed = self.verbose > 0;
        let line = match event {
            DeployEvent::PhaseStarted { phase } => {
                format!("{} {}", self.icon("▸", "==>"), phase.label())
            }
            DeployEvent::TriggerResolved {
                ci_ref,
                current_branch,
                trigger_branch,
            } => {
                if detailed {
                    format!(
                        "  trigger branch: {} (ci ref: {}, current branch: {})",
                        trigger_branch,
                        ci_ref.as_deref().unwrap_or("-"),
                        current_branch.as_deref().unwrap_or("detached"),
                    )
                } else {
                    format!("  trigger branch: {}", trigger_branch)
                }
            }
            DeployEvent::GitUserConfigured { name, email } => {
                if !detailed {
                    return None;
                }
                format!("  git user: {} <{}>", name, email)
            }
            DeployEvent::RemoteSyncFailed { error } => {
                return Some((
                    Target::Err,
                    format!(
                        "  {} failed to update from remote, continuing with local refs: {}",
                        self.icon("⚠", "warning:"),
                        error
                    ),
                ))
            }
            DeployEvent::TriggerHead { hash, message } => {
                format!("  on commit {}: {}", hash, first_line(message))
            }
            DeployEvent::ForceDeployRequested { marker } => {
                format!("  '{}' found, deploying every build file", marker)
            }
            DeployEvent::RecentCommits { commits } => {
                if !detailed {
                    return None;
                }
                format!("  recent commits: {}", commits.join(", "))
            }
            DeployEvent::DeployBranchCheckedOut {
                branch,
                origin,
                hash,
                message,
            } => {
                let how = match origin {
                    BranchOrigin::Local => "checked out",
                    BranchOrigin::Remote => "created from remote",
                    BranchOrigin::Created => "created",
                };
                format!(
                    "  deploy branch {} {} at {}: {}",
                    branch,
                    how,
                    hash,
                    first_line(message)
                )
            }
            DeployEvent::BranchUniqueCommits { commits } => {
                if !detailed {
                    return None;
                }
                indented_list("previous build commits", commits)
            }
            DeployEvent::FullBuildCommitsFound { count } => match count {
                0 => "  no previous full build, first deploy of this branch".to_string(),
                n => format!("  replaying {} full build commit(s)", n),
            },
            DeployEvent::BranchReset {
                branch,
                target,
                hash,
            } => format!("  reset {} to {} ({})", branch, target, hash),
            DeployEvent::CherryPicking {
                hash,
                message,
                squash,
            } => format!(
                "  {} {}: {}",
                if *squash { "squashing" } else { "cherry-picking" },
                hash,
                message
            ),
            DeployEvent::BuildStarted { command } => format!("  running `{}`", command),
            DeployEvent::BuildOutput { stream, line } => {
                let target = match stream {
                    OutputStream::Stdout => Target::Out,
                    OutputStream::Stderr => Target::Err,
                };
                return Some((target, format!("    {}", line)));
            }
            DeployEvent::BuildFinished {
                public_dir,
                entry_count,
            } => format!(
                "  {} build done, {} entries in {}",
                self.icon("✓", "ok:"),
                entry_count,
                public_dir.display()
            ),
            DeployEvent::GitIgnoreUpdated {
                public_dir,
                removed,
            } => {
                if !removed && !detailed {
                    return None;
                }
                if *removed {
                    format!("  removed {} from .gitignore", public_dir)
                } else {
                    format!("  {} was not git-ignored", public_dir)
                }
            }
            DeployEvent::ChangesDetected {
                changed,
                unchanged_count,
                forced,
            } => {
                let mut line = format!(
                    "  {} changed file(s), {} unchanged{}",
                    changed.len(),
                    unchanged_count,
                    if *forced { " (forced)" } else { "" }
                );
                if detailed {
                    for path in changed {
                        line.push_str(&format!("\n    {}", path.display()));
                    }
                }
                line
            }
            DeployEvent::NoChanges => "  no changed files to deploy".to_string(),
            DeployEvent::FullBuildCommitted { hash, message } => {
                format!("  committed {}: {}", hash, message)
            }
            DeployEvent::ChunksPlanned {
                chunk_count,
                total_files,
                budget,
                unit,
            } => format!(
                "  {} file(s) split into {} chunk(s) of at most {} {}",
                total_files, chunk_count, budget, unit
            ),
            DeployEvent::ChunkStarted {
                index,
                chunk_count,
                files,
                total_files,
            } => {
                let mut line = format!(
                    "  [{}/{}] uploading {} of {} file(s)",
                    index + 1,
                    chunk_count,
                    files.len(),
                    total_files
                );
                if detailed {
                    for path in files {
                        line.push_str(&format!("\n    {}", path.display()));
                    }
                }
                line
            }
            DeployEvent::ChunkPushed {
                index,
                hash,
                branch,
            } => format!("  [{}] pushed {} to {}", index + 1, hash, branch),
            DeployEvent::DeployPollPending { target, pending } => {
                if !detailed {
                    return None;
                }
                match target {
                    PollTarget::Start => "    waiting for the deploy to start...".to_string(),
                    PollTarget::Finish { deploy_id } => format!(
                        "    waiting for deploy {} ({} in progress)...",
                        deploy_id, pending
                    ),
                }
            }
            DeployEvent::RemoteDeployStarted { deploy_id } => {
                format!("  deploy {} started", deploy_id)
            }
            DeployEvent::RemoteDeployFinished {
                deploy_id,
                elapsed_secs,
            } => format!(
                "  {} deploy {} finished after {:.1}s",
                self.icon("✓", "ok:"),
                deploy_id,
                elapsed_secs
            ),
            DeployEvent::RollingBack {
                branch,
                abort_ref,
                reason,
            } => {
                return Some((
                    Target::Err,
                    format!(
                        "  {} {}; resetting {} to {}",
                        self.icon("✗", "error:"),
                        reason,
                        branch,
                        abort_ref
                    ),
                ))
            }
            DeployEvent::BranchPushed { branch, remote } => {
                format!("  pushed {} to {}", branch, remote)
            }
            DeployEvent::Completed {
                chunk_count,
                total_files,
                elapsed_secs,
            } => format!(
                "{} {} chunk(s) deployed, {} file(s), took {:.1}s",
                self.icon("✓", "Done:"),
                chunk_count,
                total_files,
                elapsed_secs
            ),
        };
        Some((Target::Out, line))
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

fn indented_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return format!("  {}: none", title);
    }
    let mut out = format!("  {}:", title);
    for item in items {
        out.push_str(&format!("\n    {}", item));
    }
    out
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let Some((target, line)) = self.render(&event) else {
            return;
        };
        let writer = match target {
            Target::Out => &self.out,
            Target::Err => &self.err,
        };
        if let Ok(mut writer) = writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.verbose > 0
    }
}
