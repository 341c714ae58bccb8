//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{
    BranchOrigin, DeployEvent, DeployEventSink, OutputStream, PollTarget,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

fn paths(files: &[PathBuf]) -> Vec<String> {
    files.iter().map(|p| p.display().to_string()).collect()
}

fn origin_str(origin: BranchOrigin) -> &'static str {
    match origin {
        BranchOrigin::Local => "local",
        BranchOrigin::Remote => "remote",
        BranchOrigin::Created => "created",
    }
}

fn stream_str(stream: OutputStream) -> &'static str {
    match stream {
        OutputStream::Stdout => "stdout",
        OutputStream::Stderr => "stderr",
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::PhaseStarted { phase } => serde_json::json!({
                "event": "phase",
                "phase": phase.as_str(),
            }),

            DeployEvent::TriggerResolved {
                ci_ref,
                current_branch,
                trigger_branch,
            } => serde_json::json!({
                "event": "trigger_resolved",
                "ci_ref": ci_ref,
                "current_branch": current_branch,
                "trigger_branch": trigger_branch,
            }),

            DeployEvent::GitUserConfigured { name, email } => serde_json::json!({
                "event": "git_user_configured",
                "name": name,
                "email": email,
            }),

            DeployEvent::RemoteSyncFailed { error } => serde_json::json!({
                "event": "remote_sync_failed",
                "error": error,
            }),

            DeployEvent::TriggerHead { hash, message } => serde_json::json!({
                "event": "trigger_head",
                "hash": hash,
                "message": message,
            }),

            DeployEvent::ForceDeployRequested { marker } => serde_json::json!({
                "event": "force_deploy",
                "marker": marker,
            }),

            DeployEvent::RecentCommits { commits } => serde_json::json!({
                "event": "recent_commits",
                "commits": commits,
            }),

            DeployEvent::DeployBranchCheckedOut {
                branch,
                origin,
                hash,
                message,
            } => serde_json::json!({
                "event": "deploy_branch_checked_out",
                "branch": branch,
                "origin": origin_str(origin),
                "hash": hash,
                "message": message,
            }),

            DeployEvent::BranchUniqueCommits { commits } => serde_json::json!({
                "event": "branch_unique_commits",
                "commits": commits,
            }),

            DeployEvent::FullBuildCommitsFound { count } => serde_json::json!({
                "event": "full_build_commits",
                "count": count,
            }),

            DeployEvent::BranchReset {
                branch,
                target,
                hash,
            } => serde_json::json!({
                "event": "branch_reset",
                "branch": branch,
                "target": target,
                "hash": hash,
            }),

            DeployEvent::CherryPicking {
                hash,
                message,
                squash,
            } => serde_json::json!({
                "event": "cherry_pick",
                "hash": hash,
                "message": message,
                "squash": squash,
            }),

            DeployEvent::BuildStarted { command } => serde_json::json!({
                "event": "build_start",
                "command": command,
            }),

            DeployEvent::BuildOutput { stream, line } => serde_json::json!({
                "event": "build_output",
                "stream": stream_str(stream),
                "line": line,
            }),

            DeployEvent::BuildFinished {
                public_dir,
                entry_count,
            } => serde_json::json!({
                "event": "build_complete",
                "public_dir": public_dir.display().to_string(),
                "entry_count": entry_count,
            }),

            DeployEvent::GitIgnoreUpdated {
                public_dir,
                removed,
            } => serde_json::json!({
                "event": "gitignore_updated",
                "public_dir": public_dir,
                "removed": removed,
            }),

            DeployEvent::ChangesDetected {
                changed,
                unchanged_count,
                forced,
            } => serde_json::json!({
                "event": "changes_detected",
                "changed_count": changed.len(),
                "changed": paths(&changed),
                "unchanged_count": unchanged_count,
                "forced": forced,
            }),

            DeployEvent::NoChanges => serde_json::json!({
                "event": "no_changes",
            }),

            DeployEvent::FullBuildCommitted { hash, message } => serde_json::json!({
                "event": "full_build_committed",
                "hash": hash,
                "message": message,
            }),

            DeployEvent::ChunksPlanned {
                chunk_count,
                total_files,
                budget,
                unit,
            } => serde_json::json!({
                "event": "chunks_planned",
                "chunk_count": chunk_count,
                "total_files": total_files,
                "budget": budget,
                "unit": unit,
            }),

            DeployEvent::ChunkStarted {
                index,
                chunk_count,
                files,
                total_files,
            } => serde_json::json!({
                "event": "chunk_start",
                "index": index,
                "chunk_count": chunk_count,
                "files": paths(&files),
                "total_files": total_files,
            }),

            DeployEvent::ChunkPushed {
                index,
                hash,
                branch,
            } => serde_json::json!({
                "event": "chunk_pushed",
                "index": index,
                "hash": hash,
                "branch": branch,
            }),

            DeployEvent::DeployPollPending { target, pending } => match target {
                PollTarget::Start => serde_json::json!({
                    "event": "poll_pending",
                    "waiting_for": "start",
                    "pending": pending,
                }),
                PollTarget::Finish { deploy_id } => serde_json::json!({
                    "event": "poll_pending",
                    "waiting_for": "finish",
                    "deploy_id": deploy_id,
                    "pending": pending,
                }),
            },

            DeployEvent::RemoteDeployStarted { deploy_id } => serde_json::json!({
                "event": "remote_deploy_start",
                "deploy_id": deploy_id,
            }),

            DeployEvent::RemoteDeployFinished {
                deploy_id,
                elapsed_secs,
            } => serde_json::json!({
                "event": "remote_deploy_complete",
                "deploy_id": deploy_id,
                "elapsed_secs": elapsed_secs,
            }),

            DeployEvent::RollingBack {
                branch,
                abort_ref,
                reason,
            } => serde_json::json!({
                "event": "rollback",
                "branch": branch,
                "abort_ref": abort_ref,
                "reason": reason,
            }),

            DeployEvent::BranchPushed { branch, remote } => serde_json::json!({
                "event": "branch_pushed",
                "branch": branch,
                "remote": remote,
            }),

            DeployEvent::Completed {
                chunk_count,
                total_files,
                elapsed_secs,
            } => serde_json::json!({
                "event": "complete",
                "status": "success",
                "chunk_count": chunk_count,
                "total_files": total_files,
                "elapsed_secs": elapsed_secs,
            }),
        };

        self.write_event(json);
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
