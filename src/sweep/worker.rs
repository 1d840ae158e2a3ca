//! Auto-approval sweep
//!
//! Listings left pending longer than the wait period are run through the
//! moderation pipeline and decided as the sweep actor, through the same
//! `ListingService` calls an administrator uses.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::account::Actor;
use crate::clock::Clock;
use crate::config::SweepConfig;
use crate::error::MarketError;
use crate::listing::{Listing, ListingKind, ListingService};
use crate::moderation::ModerationPipeline;
use crate::store::MarketStore;

/// Outcome counters of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Decided by someone else between selection and write
    pub skipped: usize,
    pub failed: usize,
}

impl SweepReport {
    fn merge(&mut self, other: SweepReport) {
        self.scanned += other.scanned;
        self.approved += other.approved;
        self.rejected += other.rejected;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct SweepWorker {
    store: Arc<dyn MarketStore>,
    listings: ListingService,
    pipeline: ModerationPipeline,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
}

impl SweepWorker {
    pub fn new(
        store: Arc<dyn MarketStore>,
        listings: ListingService,
        pipeline: ModerationPipeline,
        clock: Arc<dyn Clock>,
        config: SweepConfig,
    ) -> Self {
        Self {
            store,
            listings,
            pipeline,
            clock,
            config,
        }
    }

    /// Decide every stale pending item, then every stale pending service
    pub async fn sweep_once(&self) -> SweepReport {
        let cutoff = self.clock.now() - self.config.wait_period();
        let mut report = SweepReport::default();

        for kind in [ListingKind::Item, ListingKind::Service] {
            report.merge(self.sweep_kind(kind, cutoff).await);
        }

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                approved = report.approved,
                rejected = report.rejected,
                skipped = report.skipped,
                failed = report.failed,
                "Sweep finished"
            );
        } else {
            debug!("Sweep found no stale listings");
        }
        report
    }

    /// Fetch and decide batches until no stale listing of `kind` is left.
    /// Decided rows leave the pending set, so each batch sees new candidates;
    /// a batch where nothing could be decided ends the pass.
    async fn sweep_kind(&self, kind: ListingKind, cutoff: DateTime<Utc>) -> SweepReport {
        let batch_size = self.config.batch_size.max(1);
        let mut report = SweepReport::default();

        loop {
            let candidates = match self.store.find_stale_pending(kind, cutoff, batch_size).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!(kind = %kind, error = %e, "Sweep candidate query failed");
                    break;
                }
            };
            let batch = self.decide_all(kind, &candidates).await;
            report.merge(batch);

            if candidates.len() < batch_size {
                break;
            }
            if batch.failed == batch.scanned {
                warn!(kind = %kind, failed = batch.failed, "No progress in sweep batch, deferring to next tick");
                break;
            }
        }
        report
    }

    async fn decide_all(&self, kind: ListingKind, candidates: &[Listing]) -> SweepReport {
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..Default::default()
        };

        for listing in candidates {
            // Services carry no image
            let image = match kind {
                ListingKind::Item => listing.image_ref(),
                ListingKind::Service => None,
            };
            let verdict = self
                .pipeline
                .evaluate(&listing.title, &listing.description, image)
                .await;

            let result = if verdict.approved {
                self.listings.approve(&Actor::Sweep, kind, listing.id).await
            } else {
                self.listings.reject(&Actor::Sweep, kind, listing.id).await
            };

            match result {
                Ok(_) if verdict.approved => report.approved += 1,
                Ok(_) => {
                    info!(
                        kind = %kind,
                        listing_id = listing.id,
                        reason = verdict.reason.as_deref().unwrap_or(""),
                        "Sweep rejected listing"
                    );
                    report.rejected += 1;
                }
                Err(MarketError::InvalidStateTransition { from, .. }) => {
                    debug!(kind = %kind, listing_id = listing.id, status = from, "Already decided, skipping");
                    report.skipped += 1;
                }
                Err(e) => {
                    error!(kind = %kind, listing_id = listing.id, error = %e, "Sweep decision failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Sweep on every tick until `shutdown` flips to true or its sender drops
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            wait_hours = self.config.wait_hours,
            tick_secs = self.config.tick_interval_secs,
            "Sweep worker started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Sweep worker stopped");
    }
}

/// Running sweep task
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signal the worker and wait for the current sweep to finish
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            warn!("Sweep worker already gone");
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "Sweep worker panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub fn start_sweep_worker(worker: SweepWorker) -> SweepHandle {
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(worker.run(rx));
    SweepHandle { shutdown: tx, task }
}
