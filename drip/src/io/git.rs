//! Git adapter for the commit loop.
//!
//! Every cycle ends in a commit, so the wrapper stays small and explicit:
//! each subcommand runs under a timeout and reports stderr on failure.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::io::process::{CommandOutput, run_command_with_timeout};

/// Version-control operations the driver needs.
///
/// Implementations are fallible and opaque; tests substitute a recording
/// fake instead of touching a real repository.
pub trait Vcs {
    /// Stage a single path.
    fn stage(&self, path: &Path) -> Result<()>;
    /// Commit staged changes with a message.
    fn commit(&self, message: &str) -> Result<()>;
    /// Push accumulated commits to the default remote.
    fn push(&self) -> Result<()>;
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Fail early when the workdir is not inside a git work tree.
    #[instrument(skip_all)]
    pub fn ensure_repo(&self) -> Result<()> {
        self.run_checked(&["rev-parse", "--is-inside-work-tree"])
            .with_context(|| format!("{} is not a git repository", self.workdir.display()))?;
        Ok(())
    }

    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        let output = run_command_with_timeout(cmd, self.timeout)
            .with_context(|| format!("run git {}", args.join(" ")))?;
        if output.timed_out {
            return Err(anyhow!(
                "git {} timed out after {:?}",
                args.join(" "),
                self.timeout
            ));
        }
        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr_lossy().trim()
            ));
        }
        debug!(args = ?args, "git command succeeded");
        Ok(output)
    }
}

impl Vcs for Git {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn stage(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_checked(&["add", path.as_ref()])?;
        Ok(())
    }

    #[instrument(skip_all)]
    fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message])?;
        Ok(())
    }

    #[instrument(skip_all)]
    fn push(&self) -> Result<()> {
        self.run_checked(&["push"])?;
        Ok(())
    }
}
