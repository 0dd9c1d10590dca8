//! Background bulk-status queries.
//!
//! Version-control tools can take seconds on large trees, so bulk queries run on a
//! dedicated thread. Jobs carry the ticket issued when they were scheduled and results
//! come back over a channel; the owner applies them with [`RefreshWorker::drain_results`]
//! on its own thread, where stale tickets are rejected by the cache.

use crate::backend::StatusMap;
use crate::core::error::{Result, VcsOverlayError};
use crate::watch::cache::RefreshTicket;
use crate::watch::resolver::VcRoot;
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

struct RefreshJob {
    root: Arc<VcRoot>,
    ticket: RefreshTicket,
}

struct RefreshOutcome {
    root: Arc<VcRoot>,
    ticket: RefreshTicket,
    result: Result<StatusMap>,
}

pub struct RefreshWorker {
    jobs: Option<Sender<RefreshJob>>,
    outcomes: Receiver<RefreshOutcome>,
    in_flight: HashMap<PathBuf, RefreshTicket>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    pub fn spawn() -> Result<Self> {
        let (jobs, job_rx) = crossbeam_channel::unbounded::<RefreshJob>();
        let (outcome_tx, outcomes) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("vcs-overlay-refresh".to_string())
            .spawn(move || {
                for job in job_rx {
                    log::debug!("Querying status of {}", job.root.path().display());
                    let result = job.root.backend().bulk_status();
                    let outcome = RefreshOutcome {
                        root: job.root,
                        ticket: job.ticket,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            jobs: Some(jobs),
            outcomes,
            in_flight: HashMap::new(),
            handle: Some(handle),
        })
    }

    /// Queue a bulk query unless one for the current generation is already running.
    pub fn submit(&mut self, root: &Arc<VcRoot>) -> Result<()> {
        if let Some(ticket) = self.in_flight.get(root.path()) {
            if root.cache().is_current(ticket) {
                return Ok(());
            }
        }

        let ticket = root.cache().begin_refresh();
        let jobs = self.jobs.as_ref().ok_or(VcsOverlayError::ChannelClosed)?;
        jobs.send(RefreshJob {
            root: root.clone(),
            ticket,
        })
        .map_err(|_| VcsOverlayError::ChannelClosed)?;

        self.in_flight.insert(root.path().to_path_buf(), ticket);
        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Apply finished queries; returns the roots whose cache actually changed.
    pub fn drain_results(&mut self) -> Vec<Arc<VcRoot>> {
        let outcomes: Vec<RefreshOutcome> = self.outcomes.try_iter().collect();
        self.apply(outcomes)
    }

    /// Block until every queued query has finished, then apply the results.
    pub fn wait_idle(&mut self) -> Vec<Arc<VcRoot>> {
        let mut applied = Vec::new();
        while !self.in_flight.is_empty() {
            match self.outcomes.recv() {
                Ok(outcome) => applied.extend(self.apply(vec![outcome])),
                Err(_) => break,
            }
        }
        applied
    }

    fn apply(&mut self, outcomes: Vec<RefreshOutcome>) -> Vec<Arc<VcRoot>> {
        let mut applied = Vec::new();

        for outcome in outcomes {
            if self.in_flight.get(outcome.root.path()) == Some(&outcome.ticket) {
                self.in_flight.remove(outcome.root.path());
            }

            match outcome.result {
                Ok(entries) => {
                    if outcome.root.cache().complete_refresh(outcome.ticket, entries) {
                        applied.push(outcome.root);
                    }
                }
                Err(e) => log::warn!(
                    "Status query for {} failed: {e}",
                    outcome.root.path().display()
                ),
            }
        }

        applied
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Refresh worker panicked");
            }
        }
    }
}
