//! Run configuration: CLI flags layered over optional TOML defaults.
//!
//! Resolution happens once at startup and produces an immutable
//! [`RunConfig`]; the loop never consults ambient state. Precedence is
//! explicit CLI flag > `--config` file value > built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Deserialize;

use crate::core::messages;
use crate::core::plan::CommitPlan;

/// When accumulated commits are sent to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushMode {
    /// Push after every commit.
    Every,
    /// Push once every `push_batch_size` commits, plus any remainder at the
    /// end of the run.
    Batch,
    /// Push exactly once after the final commit.
    End,
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Path to the git repository.
    pub repo: PathBuf,
    /// Average commits per hour to generate.
    pub commits_per_hour: f64,
    /// How many hours to keep the loop running.
    pub duration_hours: f64,
    /// Hard cap on the number of commits regardless of duration.
    pub max_commits: Option<u32>,
    /// Repo-relative file that receives one appended line per commit.
    pub target_file: PathBuf,
    pub push_mode: PushMode,
    /// Commits per push when `push_mode` is `batch`.
    pub push_batch_size: u32,
    /// Randomization factor for sleep intervals (0 disables jitter).
    pub jitter: f64,
    /// Lower bound on sampled wait seconds.
    pub min_wait_secs: f64,
    /// Resolved commit-message pool (seed file or built-in defaults).
    pub messages: Vec<String>,
    /// Wall-clock bound on each git invocation.
    pub command_timeout_secs: u64,
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            commits_per_hour: 20.0,
            duration_hours: 1.0,
            max_commits: None,
            target_file: PathBuf::from("activity-log.md"),
            push_mode: PushMode::End,
            push_batch_size: 5,
            jitter: 0.5,
            min_wait_secs: 15.0,
            messages: messages::default_pool(),
            command_timeout_secs: 120,
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// Reject invalid parameters before any sleep, file write, or git
    /// invocation (dry-run included).
    pub fn validate(&self) -> Result<()> {
        if self.push_batch_size == 0 {
            bail!("push-batch-size must be > 0");
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            bail!("jitter must be >= 0 (got {})", self.jitter);
        }
        if !self.min_wait_secs.is_finite() || self.min_wait_secs < 0.0 {
            bail!("min-wait-secs must be >= 0 (got {})", self.min_wait_secs);
        }
        if let Some(cap) = self.max_commits
            && cap == 0
        {
            bail!("max-commits must be > 0 when set");
        }
        if self.command_timeout_secs == 0 {
            bail!("command-timeout-secs must be > 0");
        }
        if self.messages.is_empty() {
            bail!("commit message pool is empty");
        }
        self.plan()?;
        Ok(())
    }

    /// Derived commit schedule for this configuration.
    pub fn plan(&self) -> Result<CommitPlan> {
        CommitPlan::resolve(self.commits_per_hour, self.duration_hours, self.max_commits)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Optional TOML defaults file (`--config`).
///
/// Any present field becomes the default for the matching CLI flag; explicit
/// flags still win. Intended to be edited by humans, so unknown keys are
/// rejected rather than silently ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub repo: Option<PathBuf>,
    pub commits_per_hour: Option<f64>,
    pub duration_hours: Option<f64>,
    pub max_commits: Option<u32>,
    pub target_file: Option<PathBuf>,
    pub push_mode: Option<PushMode>,
    pub push_batch_size: Option<u32>,
    pub jitter: Option<f64>,
    pub min_wait_secs: Option<f64>,
    pub message_seed_file: Option<PathBuf>,
    pub command_timeout_secs: Option<u64>,
}

/// Load the defaults file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Flag values as parsed from the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub repo: Option<PathBuf>,
    pub commits_per_hour: Option<f64>,
    pub duration_hours: Option<f64>,
    pub max_commits: Option<u32>,
    pub target_file: Option<PathBuf>,
    pub push_mode: Option<PushMode>,
    pub push_batch_size: Option<u32>,
    pub jitter: Option<f64>,
    pub min_wait_secs: Option<f64>,
    pub message_seed_file: Option<PathBuf>,
    pub command_timeout_secs: Option<u64>,
    pub dry_run: bool,
}

/// Layer CLI overrides on file defaults on built-ins, load the message
/// pool, and validate.
pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<RunConfig> {
    let defaults = RunConfig::default();

    let seed_file = overrides.message_seed_file.or(file.message_seed_file);
    let messages = match &seed_file {
        Some(path) => load_message_pool(path)?,
        None => messages::default_pool(),
    };

    let config = RunConfig {
        repo: overrides.repo.or(file.repo).unwrap_or(defaults.repo),
        commits_per_hour: overrides
            .commits_per_hour
            .or(file.commits_per_hour)
            .unwrap_or(defaults.commits_per_hour),
        duration_hours: overrides
            .duration_hours
            .or(file.duration_hours)
            .unwrap_or(defaults.duration_hours),
        max_commits: overrides.max_commits.or(file.max_commits),
        target_file: overrides
            .target_file
            .or(file.target_file)
            .unwrap_or(defaults.target_file),
        push_mode: overrides
            .push_mode
            .or(file.push_mode)
            .unwrap_or(defaults.push_mode),
        push_batch_size: overrides
            .push_batch_size
            .or(file.push_batch_size)
            .unwrap_or(defaults.push_batch_size),
        jitter: overrides.jitter.or(file.jitter).unwrap_or(defaults.jitter),
        min_wait_secs: overrides
            .min_wait_secs
            .or(file.min_wait_secs)
            .unwrap_or(defaults.min_wait_secs),
        messages,
        command_timeout_secs: overrides
            .command_timeout_secs
            .or(file.command_timeout_secs)
            .unwrap_or(defaults.command_timeout_secs),
        dry_run: overrides.dry_run,
    };
    config.validate()?;
    Ok(config)
}

/// Load one commit-message fragment per line from a seed file.
fn load_message_pool(path: &Path) -> Result<Vec<String>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read seed file {}", path.display()))?;
    Ok(messages::parse_pool(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_with_no_inputs_yields_defaults() {
        let config = resolve(Overrides::default(), FileConfig::default()).expect("resolve");
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn file_values_fill_unset_flags() {
        let file: FileConfig = toml::from_str(
            r#"
            commits_per_hour = 6.0
            push_mode = "batch"
            push_batch_size = 2
            "#,
        )
        .expect("parse");
        let config = resolve(Overrides::default(), file).expect("resolve");
        assert_eq!(config.commits_per_hour, 6.0);
        assert_eq!(config.push_mode, PushMode::Batch);
        assert_eq!(config.push_batch_size, 2);
        assert_eq!(config.duration_hours, 1.0);
    }

    #[test]
    fn explicit_flags_override_file_values() {
        let file = FileConfig {
            commits_per_hour: Some(6.0),
            jitter: Some(0.1),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            commits_per_hour: Some(12.0),
            ..Overrides::default()
        };
        let config = resolve(overrides, file).expect("resolve");
        assert_eq!(config.commits_per_hour, 12.0);
        assert_eq!(config.jitter, 0.1);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let err = toml::from_str::<FileConfig>("not_a_key = 1").unwrap_err();
        assert!(err.to_string().contains("not_a_key"));
    }

    #[test]
    fn seed_file_becomes_message_pool() {
        let temp = tempfile::tempdir().expect("tempdir");
        let seed = temp.path().join("phrases.txt");
        fs::write(&seed, "alpha\nbeta\n").expect("write seed");

        let overrides = Overrides {
            message_seed_file: Some(seed),
            ..Overrides::default()
        };
        let config = resolve(overrides, FileConfig::default()).expect("resolve");
        assert_eq!(config.messages, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn missing_seed_file_is_an_error() {
        let overrides = Overrides {
            message_seed_file: Some(PathBuf::from("/definitely/missing/phrases.txt")),
            ..Overrides::default()
        };
        let err = resolve(overrides, FileConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("read seed file"));
    }

    #[test]
    fn zero_rate_is_rejected_at_resolution() {
        let overrides = Overrides {
            commits_per_hour: Some(0.0),
            ..Overrides::default()
        };
        assert!(resolve(overrides, FileConfig::default()).is_err());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let base = RunConfig::default();

        let config = RunConfig {
            push_batch_size: 0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            jitter: -0.5,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            min_wait_secs: -1.0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            max_commits: Some(0),
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            command_timeout_secs: 0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            messages: Vec::new(),
            ..base
        };
        assert!(config.validate().is_err());
    }
}
