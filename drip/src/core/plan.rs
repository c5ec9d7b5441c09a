//! Commit schedule math: how many commits, how far apart.

use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Derived schedule for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommitPlan {
    /// Total number of commits to make.
    pub total: u32,
    /// Nominal spacing between commits (configured duration / total).
    pub nominal: Duration,
}

impl CommitPlan {
    /// Build a plan from rate and duration, clamped by an optional hard cap.
    ///
    /// The target count is `round(commits_per_hour * duration_hours)`; a
    /// configuration that rounds to zero commits is rejected.
    pub fn resolve(
        commits_per_hour: f64,
        duration_hours: f64,
        max_commits: Option<u32>,
    ) -> Result<Self> {
        if !commits_per_hour.is_finite() || commits_per_hour <= 0.0 {
            bail!("commits-per-hour must be positive (got {commits_per_hour})");
        }
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            bail!("duration-hours must be positive (got {duration_hours})");
        }

        let rounded = (commits_per_hour * duration_hours).round();
        if rounded < 1.0 {
            bail!(
                "commits-per-hour ({commits_per_hour}) x duration-hours ({duration_hours}) \
                 rounds to zero commits"
            );
        }
        if rounded > f64::from(u32::MAX) {
            bail!("commit target {rounded} is out of range");
        }

        let mut total = rounded as u32;
        if let Some(cap) = max_commits {
            total = total.min(cap.max(1));
        }

        let nominal = Duration::try_from_secs_f64(duration_hours * 3600.0 / f64::from(total))
            .context("nominal interval out of range")?;
        Ok(Self { total, nominal })
    }
}
