//! Test-only fakes and fixtures for exercising the commit loop.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::io::git::Vcs;
use crate::pacer::Pacer;

/// A call observed by [`RecordingVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Stage(PathBuf),
    Commit(String),
    Push,
}

/// Vcs fake that records calls instead of touching a repository.
///
/// With `failing_on(n)`, the nth call (1-indexed) fails and is not recorded,
/// mimicking a git invocation that had no effect.
#[derive(Debug, Default)]
pub struct RecordingVcs {
    pub calls: RefCell<Vec<VcsCall>>,
    seen: Cell<usize>,
    fail_on: Option<usize>,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call_index: usize) -> Self {
        Self {
            fail_on: Some(call_index),
            ..Self::default()
        }
    }

    pub fn stages(&self) -> usize {
        self.count(|call| matches!(call, VcsCall::Stage(_)))
    }

    pub fn commits(&self) -> usize {
        self.count(|call| matches!(call, VcsCall::Commit(_)))
    }

    pub fn pushes(&self) -> usize {
        self.count(|call| matches!(call, VcsCall::Push))
    }

    fn count(&self, matcher: impl Fn(&VcsCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matcher(call)).count()
    }

    fn record(&self, call: VcsCall) -> Result<()> {
        let index = self.seen.get() + 1;
        self.seen.set(index);
        if Some(index) == self.fail_on {
            bail!("scripted vcs failure on call {index}");
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl Vcs for RecordingVcs {
    fn stage(&self, path: &Path) -> Result<()> {
        self.record(VcsCall::Stage(path.to_path_buf()))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(VcsCall::Commit(message.to_string()))
    }

    fn push(&self) -> Result<()> {
        self.record(VcsCall::Push)
    }
}

/// Pacer fake that replays fixed waits and advances a virtual clock on
/// `sleep`, so tests can assert exact wait sequences and exercise the
/// duration safety bound without real time passing.
#[derive(Debug)]
pub struct ScriptedPacer {
    waits: Vec<Duration>,
    next: usize,
    clock: Duration,
}

impl ScriptedPacer {
    /// Replays `waits` in order; once exhausted, returns zero waits.
    pub fn new(waits: Vec<Duration>) -> Self {
        Self {
            waits,
            next: 0,
            clock: Duration::ZERO,
        }
    }

    /// Pacer that never waits.
    pub fn instant() -> Self {
        Self::new(Vec::new())
    }
}

impl Pacer for ScriptedPacer {
    fn next_wait(&mut self, _nominal: Duration) -> Duration {
        let wait = self.waits.get(self.next).copied().unwrap_or(Duration::ZERO);
        self.next += 1;
        wait
    }

    fn sleep(&mut self, wait: Duration) {
        self.clock += wait;
    }

    fn elapsed(&self) -> Duration {
        self.clock
    }

    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// Initialized git repository in a tempdir, wired to a local bare remote.
///
/// Starts with a single bootstrap commit that exists on both sides.
pub struct TestRepo {
    root: tempfile::TempDir,
    remote: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("create workdir")?;
        let remote = tempfile::tempdir().context("create remote dir")?;

        run_git(remote.path(), &["init", "--bare", "--initial-branch=main"])?;
        run_git(root.path(), &["init", "--initial-branch=main"])?;
        run_git(root.path(), &["config", "user.name", "Drip Test"])?;
        run_git(root.path(), &["config", "user.email", "drip-test@local.invalid"])?;
        let remote_url = remote.path().to_string_lossy().to_string();
        run_git(root.path(), &["remote", "add", "origin", &remote_url])?;

        std::fs::write(root.path().join("README.txt"), "test repo seed\n")
            .context("write seed")?;
        run_git(root.path(), &["add", "."])?;
        run_git(root.path(), &["commit", "-m", "chore: bootstrap test repo"])?;
        run_git(root.path(), &["push", "-u", "origin", "main"])?;

        Ok(Self { root, remote })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Commit count on the local branch.
    pub fn local_commits(&self) -> Result<usize> {
        count_commits(self.root.path())
    }

    /// Commit count visible on the bare remote.
    pub fn remote_commits(&self) -> Result<usize> {
        count_commits(self.remote.path())
    }
}

fn count_commits(repo: &Path) -> Result<usize> {
    let out = run_git(repo, &["rev-list", "--count", "HEAD"])?;
    out.trim().parse::<usize>().context("parse rev-list count")
}

/// Run a git command, failing loudly with stderr attached.
pub fn run_git(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("run git {args:?}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {args:?} failed: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
