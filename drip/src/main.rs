//! Randomized commit-cadence CLI.
//!
//! Appends one line per cycle to a log file, commits it, and pushes on a
//! configurable policy, with jittered waits between cycles. See `--help`
//! for the full flag surface.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use drip::config::{self, FileConfig, Overrides, PushMode, RunConfig};
use drip::core::jitter::JitterParams;
use drip::io::git::Git;
use drip::pacer::SystemPacer;
use drip::run::run_loop;
use drip::{exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "drip",
    version,
    about = "Randomized commit cadence for a git repository"
)]
struct Cli {
    /// Path to the git repository (default: current directory).
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Average commits per hour to generate.
    #[arg(long, value_name = "FLOAT")]
    commits_per_hour: Option<f64>,

    /// How many hours to keep the loop running.
    #[arg(long, value_name = "FLOAT")]
    duration_hours: Option<f64>,

    /// Hard cap on the number of commits regardless of duration.
    #[arg(long, value_name = "INT")]
    max_commits: Option<u32>,

    /// File that receives one appended line per commit.
    #[arg(long, value_name = "PATH")]
    target_file: Option<PathBuf>,

    /// When to push accumulated commits.
    #[arg(long, value_enum)]
    push_mode: Option<PushMode>,

    /// Commits per push when push-mode is batch.
    #[arg(long, value_name = "INT")]
    push_batch_size: Option<u32>,

    /// Randomization factor for sleep intervals (0 disables jitter).
    #[arg(long, value_name = "FLOAT")]
    jitter: Option<f64>,

    /// Lower bound on sampled wait seconds.
    #[arg(long, value_name = "FLOAT")]
    min_wait_secs: Option<f64>,

    /// File with one commit message fragment per line.
    #[arg(long, value_name = "PATH")]
    message_seed_file: Option<PathBuf>,

    /// Wall-clock bound in seconds on each git invocation.
    #[arg(long, value_name = "INT")]
    command_timeout_secs: Option<u64>,

    /// TOML file supplying defaults for unset flags.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report planned actions without sleeping, writing, or invoking git.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let config = match resolve_config(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(exit_codes::INVALID);
        }
    };

    if let Err(err) = execute(&config) {
        eprintln!("{err:#}");
        std::process::exit(exit_codes::FAILED);
    }
}

fn resolve_config(cli: Cli) -> Result<RunConfig> {
    let file = match &cli.config {
        Some(path) => config::load_file_config(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        repo: cli.repo,
        commits_per_hour: cli.commits_per_hour,
        duration_hours: cli.duration_hours,
        max_commits: cli.max_commits,
        target_file: cli.target_file,
        push_mode: cli.push_mode,
        push_batch_size: cli.push_batch_size,
        jitter: cli.jitter,
        min_wait_secs: cli.min_wait_secs,
        message_seed_file: cli.message_seed_file,
        command_timeout_secs: cli.command_timeout_secs,
        dry_run: cli.dry_run,
    };
    config::resolve(overrides, file)
}

fn execute(config: &RunConfig) -> Result<()> {
    let plan = config.plan()?;
    println!(
        "plan: commits={} duration_hours={:.2} nominal_interval_secs={:.1} push_mode={:?}{}",
        plan.total,
        config.duration_hours,
        plan.nominal.as_secs_f64(),
        config.push_mode,
        if config.dry_run { " dry_run=true" } else { "" }
    );

    let git = Git::new(&config.repo, config.command_timeout());
    if !config.dry_run {
        git.ensure_repo()?;
    }

    let mut pacer = SystemPacer::new(JitterParams {
        factor: config.jitter,
        min_wait_secs: config.min_wait_secs,
    });

    let outcome = run_loop(config, &git, &mut pacer, |report| {
        println!(
            "cycle: seq={}/{} waited_secs={:.1} pushed={} message=\"{}\"",
            report.seq,
            report.total,
            report.waited.as_secs_f64(),
            report.pushed,
            report.message
        );
    })?;

    println!(
        "done: commits={} pushes={} elapsed_secs={:.1} stop={:?}",
        outcome.commits,
        outcome.pushes,
        outcome.elapsed.as_secs_f64(),
        outcome.stop
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_to_unset_flags() {
        let cli = Cli::parse_from(["drip"]);
        assert!(cli.commits_per_hour.is_none());
        assert!(cli.push_mode.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn parse_full_flag_surface() {
        let cli = Cli::parse_from([
            "drip",
            "--repo",
            "/tmp/work",
            "--commits-per-hour",
            "4",
            "--duration-hours",
            "2.5",
            "--max-commits",
            "7",
            "--target-file",
            "notes/activity-log.md",
            "--push-mode",
            "batch",
            "--push-batch-size",
            "3",
            "--jitter",
            "0.25",
            "--min-wait-secs",
            "0",
            "--dry-run",
        ]);

        assert_eq!(cli.repo, Some(PathBuf::from("/tmp/work")));
        assert_eq!(cli.commits_per_hour, Some(4.0));
        assert_eq!(cli.duration_hours, Some(2.5));
        assert_eq!(cli.max_commits, Some(7));
        assert_eq!(cli.target_file, Some(PathBuf::from("notes/activity-log.md")));
        assert_eq!(cli.push_mode, Some(PushMode::Batch));
        assert_eq!(cli.push_batch_size, Some(3));
        assert_eq!(cli.jitter, Some(0.25));
        assert_eq!(cli.min_wait_secs, Some(0.0));
        assert!(cli.dry_run);
    }

    #[test]
    fn parse_rejects_unknown_push_mode() {
        let parsed = Cli::try_parse_from(["drip", "--push-mode", "sometimes"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn resolve_rejects_zero_rate_before_any_side_effect() {
        let cli = Cli::parse_from(["drip", "--commits-per-hour", "0"]);
        assert!(resolve_config(cli).is_err());
    }
}
