//! Wall-clock and randomness seam for the commit loop.
//!
//! The [`Pacer`] trait decouples the driver from real time and real
//! randomness. Tests use a scripted pacer that replays fixed waits and
//! advances a virtual clock, so exact wait sequences can be asserted.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use crate::core::jitter::JitterParams;

/// Clock/randomizer collaborator: samples jittered waits, sleeps, tracks
/// elapsed run time, and picks message fragments.
pub trait Pacer {
    /// Sample the wait before the next commit from the jitter band.
    fn next_wait(&mut self, nominal: Duration) -> Duration;
    /// Block for `wait`.
    fn sleep(&mut self, wait: Duration);
    /// Wall-clock time since the run started.
    fn elapsed(&self) -> Duration;
    /// Uniform index into a pool of `len` elements. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Real pacer: `rand::thread_rng`, `std::thread::sleep`, `Instant`.
#[derive(Debug)]
pub struct SystemPacer {
    jitter: JitterParams,
    started: Instant,
}

impl SystemPacer {
    pub fn new(jitter: JitterParams) -> Self {
        Self {
            jitter,
            started: Instant::now(),
        }
    }
}

impl Pacer for SystemPacer {
    fn next_wait(&mut self, nominal: Duration) -> Duration {
        let (low, high) = self.jitter.band(nominal.as_secs_f64());
        let sampled = rand::thread_rng().gen_range(low..=high);
        let wait = self.jitter.clamp(sampled);
        debug!(wait_secs = wait, "sampled jittered wait");
        Duration::from_secs_f64(wait)
    }

    fn sleep(&mut self, wait: Duration) {
        std::thread::sleep(wait);
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}
