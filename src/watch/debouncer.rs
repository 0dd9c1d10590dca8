//! Coalesces bursts of change notifications per working-copy root.
//!
//! A checkout or a build touches hundreds of files in a few milliseconds; the root only
//! needs one bulk status query once things have settled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    /// Root path -> time of the most recent change under it.
    pending: HashMap<PathBuf, Instant>,
    quiet_period: Duration,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            quiet_period: Duration::from_millis(debounce_ms),
        }
    }

    /// Note a change under `root`, restarting its quiet period.
    pub fn record(&mut self, root: &Path) {
        self.pending.insert(root.to_path_buf(), Instant::now());
    }

    /// Forget a root that is no longer tracked.
    pub fn remove(&mut self, root: &Path) {
        self.pending.remove(root);
    }

    /// Roots that have been quiet long enough, removed from the pending set.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        self.take_ready_at(Instant::now())
    }

    fn take_ready_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let quiet_period = self.quiet_period;
        let mut ready = Vec::new();

        self.pending.retain(|root, last_change| {
            let settled = now.saturating_duration_since(*last_change) >= quiet_period;
            if settled {
                ready.push(root.clone());
            }
            !settled
        });

        ready.sort();
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// How long until the earliest pending root settles.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = Instant::now();
        self.pending
            .values()
            .map(|last| (*last + self.quiet_period).saturating_duration_since(now))
            .min()
    }
}
