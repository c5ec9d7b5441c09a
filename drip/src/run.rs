//! The activity loop driver: wait, mutate, commit, push.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::config::RunConfig;
use crate::core::{entry, push};
use crate::io::activity_log;
use crate::io::git::Vcs;
use crate::pacer::Pacer;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every planned commit was made.
    Completed,
    /// Elapsed wall-clock time exceeded the configured duration before all
    /// planned commits were made.
    DurationExceeded,
}

/// One completed cycle, reported through the `on_cycle` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-indexed cycle number.
    pub seq: u32,
    /// Planned total commits.
    pub total: u32,
    /// Wait sampled before this cycle (zero for the first).
    pub waited: Duration,
    /// Commit message used.
    pub message: String,
    /// Whether this cycle ended with a push.
    pub pushed: bool,
}

/// Summary of a finished run. Dry runs produce the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub commits: u32,
    pub pushes: u32,
    pub elapsed: Duration,
    pub stop: StopReason,
}

/// Run the commit loop to completion.
///
/// Sequencing per cycle: wait, append a log line, stage, commit, then push
/// when the policy says so. The first git or filesystem error halts the run
/// with the cycle index attached; nothing is retried and no final push
/// happens on the error path.
///
/// In dry-run mode the full loop executes, but sleeps, file writes, and vcs
/// calls are all skipped; planned actions are still reported via `on_cycle`
/// and counted in the outcome.
#[instrument(skip_all, fields(dry_run = config.dry_run))]
pub fn run_loop<V: Vcs, P: Pacer, F: FnMut(&CycleReport)>(
    config: &RunConfig,
    vcs: &V,
    pacer: &mut P,
    mut on_cycle: F,
) -> Result<RunOutcome> {
    let plan = config.plan()?;
    let duration_limit = Duration::try_from_secs_f64(config.duration_hours * 3600.0)
        .context("duration out of range")?;
    let target_path = config.repo.join(&config.target_file);

    info!(
        total = plan.total,
        nominal_secs = plan.nominal.as_secs_f64(),
        "starting commit loop"
    );

    let mut commits = 0u32;
    let mut pushes = 0u32;
    let mut pending = 0u32;

    for seq in 1..=plan.total {
        // Safety bound: jitter accumulation must not stretch the run past
        // the configured duration.
        if pacer.elapsed() > duration_limit {
            info!(commits, "duration limit reached, stopping early");
            break;
        }

        let waited = if seq > 1 {
            let wait = pacer.next_wait(plan.nominal);
            if config.dry_run {
                debug!(wait_secs = wait.as_secs_f64(), "dry-run, skipping sleep");
            } else {
                pacer.sleep(wait);
            }
            wait
        } else {
            Duration::ZERO
        };

        let fragment = &config.messages[pacer.pick_index(config.messages.len())];
        let message = entry::commit_message(fragment, seq, plan.total);

        if !config.dry_run {
            let line = entry::entry_line(Utc::now(), &message);
            activity_log::append_line(&target_path, &line)
                .with_context(|| format!("cycle {seq}: mutate {}", target_path.display()))?;
            vcs.stage(&config.target_file)
                .with_context(|| format!("cycle {seq}: stage"))?;
            vcs.commit(&message)
                .with_context(|| format!("cycle {seq}: commit"))?;
        }
        commits += 1;
        pending += 1;

        let pushed = push::push_due(config.push_mode, config.push_batch_size, pending);
        if pushed {
            if !config.dry_run {
                vcs.push().with_context(|| format!("cycle {seq}: push"))?;
            }
            pushes += 1;
            pending = 0;
        }

        on_cycle(&CycleReport {
            seq,
            total: plan.total,
            waited,
            message,
            pushed,
        });
    }

    let stop = if commits == plan.total {
        StopReason::Completed
    } else {
        StopReason::DurationExceeded
    };

    if push::final_push_due(config.push_mode, pending) {
        if !config.dry_run {
            vcs.push().context("final push")?;
        }
        pushes += 1;
    }

    let outcome = RunOutcome {
        commits,
        pushes,
        elapsed: pacer.elapsed(),
        stop,
    };
    info!(
        commits = outcome.commits,
        pushes = outcome.pushes,
        stop = ?outcome.stop,
        "run finished"
    );
    Ok(outcome)
}
