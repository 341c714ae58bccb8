//! Deploy Use Case Tests

use super::*;
use crate::application::poller::PollSettings;
use crate::domain::entities::{ChangeRecord, ChangeType, DeployRecord, DeployStatus, Site};
use crate::domain::ports::{
    BuildOutput, BuildRunner, CherryPickOptions, Clock, CommitOptions, DeleteBranchOptions,
    DeployApiError, DeployEvent, DeployEventSink, DeployStatusApi, GitError, GitRepository,
    GitResult, OutputStream,
};
use crate::domain::value_objects::{BranchScope, PartitionPolicy};
use crate::error::FleekDeployError;
use crate::infrastructure::LocalBuildFiles;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

const DEPLOY_BRANCH: &str = "FLEEK_ITERATIVE_DEPLOY";
const REMOTE_DEPLOY_BRANCH: &str = "origin/FLEEK_ITERATIVE_DEPLOY";

// Simulated time shared by the clock, the git push log and the deploy API

#[derive(Clone)]
struct FakeClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())),
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        let step = chrono::Duration::from_std(duration).unwrap();
        self.now.set(self.now.get() + step);
    }
}

// In-memory git: commits form a parent chain, branches point at commits

#[derive(Debug, Clone)]
struct FakeCommit {
    parent: Option<String>,
    message: String,
}

#[derive(Debug, Clone)]
struct Push {
    branch: String,
    hash: String,
    at: DateTime<Utc>,
}

#[derive(Default)]
struct GitState {
    commits: HashMap<String, FakeCommit>,
    branches: HashMap<String, String>,
    remote_branches: HashMap<String, String>,
    current: Option<String>,
    status: Vec<ChangeRecord>,
    next_id: usize,
    config: Vec<(String, String)>,
    fail_remote_sync: bool,
}

impl GitState {
    fn new_commit(&mut self, parent: Option<String>, message: &str) -> String {
        self.next_id += 1;
        let hash = format!("{:040x}", self.next_id);
        self.commits.insert(
            hash.clone(),
            FakeCommit {
                parent,
                message: message.to_string(),
            },
        );
        hash
    }

    fn resolve(&self, reference: &str) -> GitResult<String> {
        if reference == "HEAD" {
            return self.head();
        }
        self.branches
            .get(reference)
            .or_else(|| self.remote_branches.get(reference))
            .cloned()
            .or_else(|| {
                self.commits
                    .contains_key(reference)
                    .then(|| reference.to_string())
            })
            .ok_or_else(|| failed(&format!("git rev-parse {}", reference)))
    }

    fn head(&self) -> GitResult<String> {
        let branch = self
            .current
            .as_ref()
            .ok_or_else(|| failed("git rev-parse HEAD"))?;
        self.branches
            .get(branch)
            .cloned()
            .ok_or_else(|| failed("git rev-parse HEAD"))
    }

    fn set_head(&mut self, hash: String) -> GitResult<()> {
        let branch = self
            .current
            .clone()
            .ok_or_else(|| failed("git update-ref HEAD"))?;
        self.branches.insert(branch, hash);
        Ok(())
    }

    fn ancestry(&self, hash: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = Some(hash.to_string());
        while let Some(hash) = next {
            next = self.commits.get(&hash).and_then(|c| c.parent.clone());
            chain.push(hash);
        }
        chain
    }

    fn message(&self, hash: &str) -> String {
        self.commits
            .get(hash)
            .map(|c| c.message.clone())
            .unwrap_or_default()
    }
}

fn failed(command: &str) -> GitError {
    GitError::CommandFailed {
        command: command.to_string(),
        code: Some(128),
        stderr: "fatal: bad revision".to_string(),
    }
}

#[derive(Clone)]
struct FakeGit {
    state: Rc<RefCell<GitState>>,
    pushes: Rc<RefCell<Vec<Push>>>,
    clock: FakeClock,
}

impl FakeGit {
    /// Repository with `main` checked out at a single commit with `message`
    fn on_main(clock: &FakeClock, message: &str) -> Self {
        let mut state = GitState::default();
        let root = state.new_commit(None, "initial commit");
        let tip = state.new_commit(Some(root), message);
        state.branches.insert("main".to_string(), tip.clone());
        state.remote_branches.insert("origin/main".to_string(), tip);
        state.current = Some("main".to_string());

        Self {
            state: Rc::new(RefCell::new(state)),
            pushes: Rc::new(RefCell::new(Vec::new())),
            clock: clock.clone(),
        }
    }

    /// Give the deploy branch a previous full build on top of `main`
    fn with_previous_deploy(self) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let main = state.branches["main"].clone();
            let full = state.new_commit(Some(main), "add all build output 2024-02-01T00:00:00.000Z");
            let partial = state.new_commit(
                Some(full),
                "adding built files from index \"0\" of \"0\" with \"1\" files (\"1\" total files).",
            );
            state
                .branches
                .insert(DEPLOY_BRANCH.to_string(), partial.clone());
            state
                .remote_branches
                .insert(REMOTE_DEPLOY_BRANCH.to_string(), partial);
        }
        self
    }

    fn with_status(self, status: Vec<ChangeRecord>) -> Self {
        self.state.borrow_mut().status = status;
        self
    }

    fn tip(&self, branch: &str) -> String {
        self.state.borrow().branches[branch].clone()
    }

    fn remote_tip(&self, branch: &str) -> Option<String> {
        self.state.borrow().remote_branches.get(branch).cloned()
    }

    /// Messages of commits on `on` but not on `not_on`, newest first
    fn unique_messages(&self, on: &str, not_on: &str) -> Vec<String> {
        let hashes = self.commit_difference(on, not_on).unwrap();
        let state = self.state.borrow();
        hashes.iter().map(|h| state.message(h)).collect()
    }

    fn push_count(&self) -> usize {
        self.pushes.borrow().len()
    }
}

impl GitRepository for FakeGit {
    fn list_branches(&self, scope: &BranchScope) -> GitResult<Vec<String>> {
        let state = self.state.borrow();
        let mut names = Vec::new();
        if scope.includes_local() {
            names.extend(state.branches.keys().cloned());
        }
        if let Some(remote) = scope.remote() {
            let prefix = format!("{}/", remote);
            names.extend(
                state
                    .remote_branches
                    .keys()
                    .filter(|name| name.starts_with(&prefix))
                    .cloned(),
            );
        }
        names.sort();
        Ok(names)
    }

    fn current_branch(&self) -> GitResult<Option<String>> {
        Ok(self.state.borrow().current.clone())
    }

    fn checkout(&self, branch: &str) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.branches.contains_key(branch) {
            return Err(failed(&format!("git checkout {}", branch)));
        }
        state.current = Some(branch.to_string());
        Ok(())
    }

    fn create_branch(&self, name: &str) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        let head = state.head()?;
        state.branches.insert(name.to_string(), head);
        Ok(())
    }

    fn create_branch_from(&self, name: &str, start_point: &str) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        let start = state.resolve(start_point)?;
        state.branches.insert(name.to_string(), start);
        Ok(())
    }

    fn delete_branch(&self, name: &str, _options: &DeleteBranchOptions) -> GitResult<()> {
        self.state.borrow_mut().branches.remove(name);
        Ok(())
    }

    fn hard_reset(&self, reference: &str) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        let target = state.resolve(reference)?;
        state.set_head(target)
    }

    fn fetch(&self, _remote: &str, _reference: &str) -> GitResult<()> {
        Ok(())
    }

    fn update_all_from_remote(&self) -> GitResult<()> {
        if self.state.borrow().fail_remote_sync {
            return Err(failed("git fetch --all"));
        }
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, _force: bool) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        let hash = state.resolve(branch)?;
        state
            .remote_branches
            .insert(format!("{}/{}", remote, branch), hash.clone());
        self.pushes.borrow_mut().push(Push {
            branch: branch.to_string(),
            hash,
            at: self.clock.now(),
        });
        Ok(())
    }

    fn stage_all(&self) -> GitResult<()> {
        Ok(())
    }

    fn commit(&self, options: &CommitOptions) -> GitResult<String> {
        let mut state = self.state.borrow_mut();
        let head = state.head()?;
        let parent = if options.amend {
            state.commits.get(&head).and_then(|c| c.parent.clone())
        } else {
            Some(head.clone())
        };
        let message = match &options.message {
            Some(message) => message.clone(),
            None => state.message(&head),
        };
        let hash = state.new_commit(parent, &message);
        state.set_head(hash.clone())?;
        Ok(hash)
    }

    fn status(&self) -> GitResult<Vec<ChangeRecord>> {
        Ok(self.state.borrow().status.clone())
    }

    fn head_commit_hash(&self) -> GitResult<String> {
        self.state.borrow().head()
    }

    fn commit_message(&self, reference: &str) -> GitResult<String> {
        let state = self.state.borrow();
        let hash = state.resolve(reference)?;
        Ok(state.message(&hash))
    }

    fn commit_difference(&self, on: &str, not_on: &str) -> GitResult<Vec<String>> {
        let state = self.state.borrow();
        let excluded = state.ancestry(&state.resolve(not_on)?);
        Ok(state
            .ancestry(&state.resolve(on)?)
            .into_iter()
            .filter(|hash| !excluded.contains(hash))
            .collect())
    }

    fn cherry_pick(&self, hash: &str, options: &CherryPickOptions) -> GitResult<()> {
        let mut state = self.state.borrow_mut();
        if options.stage_only {
            return Ok(());
        }
        let message = state.message(hash);
        let head = state.head()?;
        let picked = state.new_commit(Some(head), &message);
        state.set_head(picked)
    }

    fn last_commits(&self, count: usize) -> GitResult<Vec<String>> {
        let state = self.state.borrow();
        Ok(state.ancestry(&state.head()?).into_iter().take(count).collect())
    }

    fn set_config(&self, key: &str, value: &str) -> GitResult<()> {
        self.state
            .borrow_mut()
            .config
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

// Deploy API that reacts to pushes: every push starts a deploy 5s later
// which succeeds 30s after it started

#[derive(Clone)]
struct FakeApi {
    pushes: Rc<RefCell<Vec<Push>>>,
    clock: FakeClock,
    never_start_from: Option<usize>,
    fail_at: Option<usize>,
    calls: Rc<Cell<usize>>,
}

impl FakeApi {
    fn new(git: &FakeGit) -> Self {
        Self {
            pushes: git.pushes.clone(),
            clock: git.clock.clone(),
            never_start_from: None,
            fail_at: None,
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn never_starting_from(mut self, push_index: usize) -> Self {
        self.never_start_from = Some(push_index);
        self
    }

    fn failing_at(mut self, push_index: usize) -> Self {
        self.fail_at = Some(push_index);
        self
    }
}

impl DeployStatusApi for FakeApi {
    fn list_sites(&self, team_id: &str) -> Result<Vec<Site>, DeployApiError> {
        Ok(vec![Site {
            id: format!("{}-site", team_id),
            name: "docs".to_string(),
            slug: Some("docs".to_string()),
        }])
    }

    fn list_deploys(&self, site_id: &str) -> Result<Vec<DeployRecord>, DeployApiError> {
        assert_eq!(site_id, "site-1");
        self.calls.set(self.calls.get() + 1);
        let now = self.clock.now();

        let mut deploys: Vec<DeployRecord> = self
            .pushes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.never_start_from.map_or(true, |k| *index < k))
            .map(|(index, push)| {
                let started_at = push.at + chrono::Duration::seconds(5);
                let finished_at = started_at + chrono::Duration::seconds(30);
                let status = if now < finished_at {
                    DeployStatus::InProgress
                } else if self.fail_at == Some(index) {
                    DeployStatus::Failed
                } else {
                    DeployStatus::Succeeded
                };
                DeployRecord {
                    id: format!("deploy-{}", index),
                    started_at,
                    completed_at: (!status.is_pending()).then_some(finished_at),
                    status,
                }
            })
            .filter(|deploy| deploy.started_at <= now)
            .collect();
        deploys.reverse();
        Ok(deploys)
    }
}

// Build command that writes a fixed set of files into the public directory

struct FakeBuildRunner {
    public_dir: PathBuf,
    files: Vec<(String, usize)>,
    exit_code: i32,
    runs: Rc<Cell<usize>>,
}

impl FakeBuildRunner {
    fn writing(public_dir: &Path, files: Vec<(String, usize)>) -> Self {
        Self {
            public_dir: public_dir.to_path_buf(),
            files,
            exit_code: 0,
            runs: Rc::new(Cell::new(0)),
        }
    }

    fn failing(public_dir: &Path, exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::writing(public_dir, Vec::new())
        }
    }
}

impl BuildRunner for FakeBuildRunner {
    fn run(
        &self,
        _command: &str,
        _cwd: &Path,
        events: &dyn DeployEventSink,
    ) -> std::io::Result<BuildOutput> {
        self.runs.set(self.runs.get() + 1);
        std::fs::create_dir_all(&self.public_dir)?;
        for (name, size) in &self.files {
            let path = self.public_dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "x".repeat(*size))?;
        }
        events.on_event(DeployEvent::BuildOutput {
            stream: OutputStream::Stdout,
            line: format!("wrote {} files", self.files.len()),
        });

        if self.exit_code == 0 {
            Ok(BuildOutput {
                exit_code: Some(0),
                stderr: String::new(),
            })
        } else {
            Ok(BuildOutput {
                exit_code: Some(self.exit_code),
                stderr: "error: page.tsx failed to compile\n".to_string(),
            })
        }
    }
}

/// Test event sink that records all events
#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<DeployEvent>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// Helpers

type TestUseCase = DeployUseCase<FakeGit, FakeApi, FakeBuildRunner, LocalBuildFiles, FakeClock>;

fn pages(count: usize, size: usize) -> Vec<(String, usize)> {
    (0..count)
        .map(|i| (format!("page-{}.html", i), size))
        .collect()
}

fn holding_status(names: &[String]) -> Vec<ChangeRecord> {
    names
        .iter()
        .map(|name| ChangeRecord::new(ChangeType::Added, format!("{}/{}", HOLDING_DIR, name)))
        .collect()
}

fn options(root: &Path) -> DeployOptions {
    DeployOptions::new(root, "site-1")
        .with_partition(PartitionPolicy::MaxItems(4))
        .with_poll_settings(PollSettings::default())
}

fn use_case(
    git: &FakeGit,
    api: FakeApi,
    builder: FakeBuildRunner,
    sink: &RecordingSink,
) -> TestUseCase {
    DeployUseCase::new(
        git.clone(),
        api,
        builder,
        LocalBuildFiles::new(),
        git.clock.clone(),
    )
    .with_event_sink(Arc::new(sink.clone()))
}

struct Checkout {
    dir: TempDir,
}

impl Checkout {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn public(&self) -> PathBuf {
        self.root().join("build")
    }

    fn public_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.public())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// Scenarios

#[test]
fn end_to_end_uploads_ten_files_in_three_chunks() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(10, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    let outcome = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap();

    let sizes: Vec<usize> = outcome.chunked_files.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(outcome.total_changes, 10);
    assert_eq!(git.push_count(), 3);

    let history = git.unique_messages(DEPLOY_BRANCH, "main");
    assert_eq!(history.len(), 4);
    assert_eq!(
        history.iter().filter(|m| m.starts_with("add all build output")).count(),
        1
    );
    assert_eq!(
        history[0],
        "adding built files from index \"2\" of \"2\" with \"2\" files (\"10\" total files)."
    );
    assert!(history[3].starts_with("add all build output"));

    assert_eq!(
        git.remote_tip(REMOTE_DEPLOY_BRANCH),
        Some(git.tip(DEPLOY_BRANCH))
    );
    assert_eq!(checkout.public_files().len(), 10);
    assert!(checkout.root().join("README.md").exists());
}

#[test]
fn chunk_plan_reports_budget_in_policy_units() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(10, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    let plan = sink.events().into_iter().find_map(|e| match e {
        DeployEvent::ChunksPlanned {
            chunk_count,
            total_files,
            budget,
            unit,
        } => Some((chunk_count, total_files, budget, unit)),
        _ => None,
    });
    assert_eq!(plan, Some((3, 10, 4, "files")));
}

#[test]
fn end_to_end_waits_for_each_deploy_before_next_push() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(10, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap();

    // Each deploy finishes 35s after its push; the next push must come later
    let pushes = git.pushes.borrow();
    for pair in pushes.windows(2) {
        assert!(pair[1].at >= pair[0].at + chrono::Duration::seconds(35));
    }

    let finished = sink
        .events()
        .iter()
        .filter(|e| matches!(e, DeployEvent::RemoteDeployFinished { .. }))
        .count();
    assert_eq!(finished, 3);
}

#[test]
fn no_changes_pushes_branch_and_returns_empty() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "tweak readme")
        .with_previous_deploy()
        .with_status(Vec::new());
    let api = FakeApi::new(&git);
    let calls = api.calls.clone();
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(3, 10));

    let outcome = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap();

    assert!(outcome.chunked_files.is_empty());
    assert_eq!(outcome.total_changes, 0);
    assert_eq!(git.push_count(), 1);
    assert_eq!(calls.get(), 0);
    assert_eq!(
        git.remote_tip(REMOTE_DEPLOY_BRANCH),
        Some(git.tip(DEPLOY_BRANCH))
    );
    // unchanged files stay in the public directory
    assert_eq!(checkout.public_files().len(), 3);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::NoChanges)));
}

#[test]
fn replay_drops_partial_commits_from_previous_run() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "tweak readme")
        .with_previous_deploy()
        .with_status(Vec::new());
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(3, 10));

    use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    let history = git.unique_messages(DEPLOY_BRANCH, "main");
    assert_eq!(history, vec!["add all build output 2024-02-01T00:00:00.000Z"]);
}

#[test]
fn unchanged_files_are_restored_before_upload() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(10, 50);
    let changed = vec!["page-1.html".to_string(), "page-7.html".to_string()];
    let git = FakeGit::on_main(&clock, "edit two pages")
        .with_previous_deploy()
        .with_status(holding_status(&changed));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);
    let opts = options(checkout.root());

    let setup = use_case(&git, api, builder, &sink).setup(&opts).unwrap();

    assert_eq!(setup.total_changes, 2);
    assert_eq!(setup.chunked_files.len(), 1);
    assert_eq!(
        setup.chunked_files[0].files(),
        &[
            opts.holding_dir_path().join("page-1.html"),
            opts.holding_dir_path().join("page-7.html"),
        ]
    );
    let public = checkout.public_files();
    assert_eq!(public.len(), 8);
    assert!(!public.contains(&"page-1.html".to_string()));

    // the previous full build was replayed, so the new one replaces it
    let history = git.unique_messages(DEPLOY_BRANCH, "main");
    assert_eq!(history.len(), 1);
    assert_ne!(history[0], "add all build output 2024-02-01T00:00:00.000Z");
    assert!(history[0].starts_with("add all build output"));
}

#[test]
fn deleted_files_are_not_uploaded() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "remove a page").with_status(vec![
        ChangeRecord::new(ChangeType::Deleted, format!("{}/gone.html", HOLDING_DIR)),
        ChangeRecord::new(ChangeType::Modified, format!("{}/page-0.html", HOLDING_DIR)),
        ChangeRecord::new(ChangeType::Modified, "src/index.ts"),
    ]);
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(2, 10));

    let setup = use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    assert_eq!(setup.total_changes, 1);
    assert!(setup.chunked_files[0].files()[0].ends_with("page-0.html"));
}

#[test]
fn force_deploy_uploads_every_file() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "redeploy everything !ForceFleekDeploy")
        .with_previous_deploy()
        .with_status(Vec::new());
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(6, 10));

    let outcome = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap();

    assert_eq!(outcome.total_changes, 6);
    assert_eq!(outcome.chunk_count(), 2);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::ForceDeployRequested { .. })));
}

#[test]
fn rollback_restores_remote_tip_on_start_timeout() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(10, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages")
        .with_previous_deploy()
        .with_status(holding_status(&names));
    let abort_ref = git.tip(DEPLOY_BRANCH);
    let api = FakeApi::new(&git).never_starting_from(1);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    let err = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap_err();

    assert!(matches!(err, FleekDeployError::DeployNotStarted { .. }));
    assert_eq!(git.remote_tip(REMOTE_DEPLOY_BRANCH), Some(abort_ref.clone()));
    assert_eq!(git.tip(DEPLOY_BRANCH), abort_ref);
    // chunk 1, chunk 2, rollback
    assert_eq!(git.push_count(), 3);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::RollingBack { .. })));
}

#[test]
fn rollback_on_failed_remote_deploy() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(5, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let abort_ref = git.tip("main");
    let api = FakeApi::new(&git).failing_at(0);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    let err = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap_err();

    assert!(matches!(err, FleekDeployError::DeployFailed { .. }));
    // first deploy: the branch started at the trigger tip
    assert_eq!(git.remote_tip(REMOTE_DEPLOY_BRANCH), Some(abort_ref));
}

#[test]
fn successful_run_is_not_rolled_back() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let files = pages(3, 50);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap();

    assert!(!sink
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::RollingBack { .. })));
    assert_ne!(git.tip(DEPLOY_BRANCH), git.tip("main"));
}

#[test]
fn self_deploy_is_rejected_before_any_mutation() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages");
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));
    let runs = builder.runs.clone();
    let opts = options(checkout.root()).with_ci_ref(Some(format!("refs/heads/{}", DEPLOY_BRANCH)));

    let err = use_case(&git, api, builder, &sink)
        .setup(&opts)
        .unwrap_err();

    assert!(matches!(err, FleekDeployError::SelfDeploy { .. }));
    assert_eq!(runs.get(), 0);
    assert!(git.state.borrow().config.is_empty());
}

#[test]
fn detached_head_without_ci_ref_is_unknown_trigger() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages");
    git.state.borrow_mut().current = None;
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));

    let err = use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap_err();

    assert!(matches!(err, FleekDeployError::UnknownTriggerBranch));
}

#[test]
fn ci_ref_wins_over_current_branch() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(Vec::new());
    {
        let mut state = git.state.borrow_mut();
        let main = state.branches["main"].clone();
        state.branches.insert("feature".to_string(), main);
        state.current = Some("feature".to_string());
    }
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));
    let opts = options(checkout.root()).with_ci_ref(Some("refs/heads/main".to_string()));

    use_case(&git, api, builder, &sink).setup(&opts).unwrap();

    let trigger = sink.events().into_iter().find_map(|e| match e {
        DeployEvent::TriggerResolved { trigger_branch, .. } => Some(trigger_branch),
        _ => None,
    });
    assert_eq!(trigger.as_deref(), Some("main"));
}

#[test]
fn no_build_marker_aborts_before_build() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "fix typo NOBUILD!");
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));
    let runs = builder.runs.clone();

    let err = use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap_err();

    match err {
        FleekDeployError::NoBuildRequested { marker, .. } => assert_eq!(marker, "nobuild!"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runs.get(), 0);
}

#[test]
fn build_failure_is_fatal_without_push() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages");
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::failing(&checkout.public(), 2);

    let err = use_case(&git, api, builder, &sink)
        .deploy_iteratively(&options(checkout.root()))
        .unwrap_err();

    match err {
        FleekDeployError::BuildFailed { status, stderr, .. } => {
            assert_eq!(status, "exit code 2");
            assert_eq!(stderr, "error: page.tsx failed to compile");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(git.push_count(), 0);
}

#[test]
fn remote_sync_failure_is_not_fatal() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(Vec::new());
    git.state.borrow_mut().fail_remote_sync = true;
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));

    use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::RemoteSyncFailed { .. })));
}

#[test]
fn deploy_branch_is_created_from_remote_copy() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages")
        .with_previous_deploy()
        .with_status(Vec::new());
    let remote_tip = git.tip(DEPLOY_BRANCH);
    git.state.borrow_mut().branches.remove(DEPLOY_BRANCH);
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));

    let setup = use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    assert_eq!(setup.abort_ref, remote_tip);
    let origin = sink.events().into_iter().find_map(|e| match e {
        DeployEvent::DeployBranchCheckedOut { origin, .. } => Some(origin),
        _ => None,
    });
    assert_eq!(origin, Some(crate::domain::ports::BranchOrigin::Remote));
}

#[test]
fn git_user_is_configured() {
    let checkout = Checkout::new();
    let clock = FakeClock::new();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(Vec::new());
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), pages(1, 1));

    use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    assert_eq!(
        git.state.borrow().config,
        vec![
            ("user.name".to_string(), DEFAULT_GIT_USER_NAME.to_string()),
            ("user.email".to_string(), DEFAULT_GIT_USER_EMAIL.to_string()),
        ]
    );
}

#[test]
fn gitignored_public_dir_is_unignored_before_full_build_commit() {
    let checkout = Checkout::new();
    std::fs::write(checkout.root().join(".gitignore"), "node_modules\nbuild\n").unwrap();
    let clock = FakeClock::new();
    let files = pages(1, 10);
    let names: Vec<String> = files.iter().map(|(n, _)| n.clone()).collect();
    let git = FakeGit::on_main(&clock, "add docs pages").with_status(holding_status(&names));
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), files);

    use_case(&git, api, builder, &sink)
        .setup(&options(checkout.root()))
        .unwrap();

    let gitignore = std::fs::read_to_string(checkout.root().join(".gitignore")).unwrap();
    assert!(!gitignore.lines().any(|line| line == "build"));
    assert!(gitignore.contains("node_modules"));
}

#[test]
fn list_team_sites_uses_team_id() {
    let clock = FakeClock::new();
    let checkout = Checkout::new();
    let git = FakeGit::on_main(&clock, "add docs pages");
    let api = FakeApi::new(&git);
    let sink = RecordingSink::default();
    let builder = FakeBuildRunner::writing(&checkout.public(), Vec::new());

    let sites = use_case(&git, api, builder, &sink)
        .list_team_sites("team-9")
        .unwrap();

    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].id, "team-9-site");
}
