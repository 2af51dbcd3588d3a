//! Coalescing regeneration queue.
//!
//! A single background worker performs runs one at a time. Every trigger
//! bumps a requested-generation counter; when the worker finishes a run it
//! looks at the counter once, so any number of triggers that arrived during
//! the run collapse into exactly one follow-up run.

use std::sync::{Arc, Mutex};

use map_common::StoryLocationRef;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::orchestrator::{RegenerationSummary, Regenerator};

/// Identifies a trigger. A run covers every ticket up to the requested
/// generation it observed when it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Result of a queued run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RegenerationSummary),
    Failed { kind: &'static str, message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn summary(&self) -> Option<&RegenerationSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            RunOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Requests {
    generation: u64,
    closing: bool,
}

#[derive(Debug, Clone, Default)]
struct Completed {
    generation: u64,
    outcome: Option<RunOutcome>,
}

/// Serializes regeneration triggers onto one background worker.
pub struct RegenerationQueue {
    requested: watch::Sender<Requests>,
    completed: watch::Receiver<Completed>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RegenerationQueue {
    /// Spawn the worker on the current runtime.
    pub fn start(regenerator: Arc<Regenerator>) -> Self {
        let (requested, requested_rx) = watch::channel(Requests::default());
        let (completed_tx, completed) = watch::channel(Completed::default());
        let worker = tokio::spawn(run_worker(regenerator, requested_rx, completed_tx));

        Self {
            requested,
            completed,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Request a regeneration without waiting for it.
    ///
    /// If a run is already pending, this trigger is folded into it; if one
    /// is in flight, exactly one more run follows it.
    pub fn trigger(&self) -> Ticket {
        let done = self.completed.borrow().generation;
        let mut generation = 0;
        let mut coalesced = false;
        self.requested.send_modify(|requests| {
            coalesced = requests.generation > done;
            requests.generation += 1;
            generation = requests.generation;
        });

        metrics::record_trigger(coalesced);
        debug!(generation, coalesced, "Regeneration requested");
        Ticket(generation)
    }

    /// Hook for the record store: a story was approved and should appear
    /// on the map.
    pub fn on_new_approved_record(&self, record: &StoryLocationRef) -> Ticket {
        info!(id = %record.id, prefix = %record.postal_prefix, "New approved story, scheduling regeneration");
        self.trigger()
    }

    /// Wait for the first run that covers `ticket`.
    ///
    /// Returns `None` if the worker stopped before getting to it.
    pub async fn wait_for(&self, ticket: Ticket) -> Option<RunOutcome> {
        let mut completed = self.completed.clone();
        let done = completed
            .wait_for(|c| c.generation >= ticket.0)
            .await
            .ok()?;
        done.outcome.clone()
    }

    /// Outcome of the most recent run, if any has finished.
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.completed.borrow().outcome.clone()
    }

    /// Whether a requested run has not finished yet.
    pub fn is_busy(&self) -> bool {
        self.requested.borrow().generation > self.completed.borrow().generation
    }

    /// Finish any pending run, then stop the worker.
    pub async fn shutdown(&self) {
        self.requested.send_modify(|requests| requests.closing = true);
        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "Regeneration worker ended abnormally");
            }
        }
        info!("Regeneration queue stopped");
    }
}

impl Drop for RegenerationQueue {
    fn drop(&mut self) {
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(worker) = worker.take() {
                worker.abort();
            }
        }
    }
}

async fn run_worker(
    regenerator: Arc<Regenerator>,
    mut requested: watch::Receiver<Requests>,
    completed: watch::Sender<Completed>,
) {
    let mut done = 0u64;
    loop {
        let target = match requested
            .wait_for(|r| r.generation > done || r.closing)
            .await
        {
            Ok(requests) => *requests,
            Err(_) => break,
        };
        if target.generation <= done {
            break;
        }

        debug!(generation = target.generation, "Starting regeneration run");
        let outcome = match regenerator.regenerate().await {
            Ok(summary) => RunOutcome::Completed(summary),
            Err(e) => RunOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        };

        done = target.generation;
        completed.send_replace(Completed {
            generation: done,
            outcome: Some(outcome),
        });
    }
    debug!(generation = done, "Regeneration worker exiting");
}
