//! Priority scheduler
//!
//! Orders batches by dynamic priority and drives the age → sort → dispatch
//! flow against an execution engine.
//!
//! ## Ordering
//!
//! Highest dynamic priority first. Jobs with equal priority are ordered by
//! ascending id, so the dispatch order is fully deterministic.
//!
//! Sorting never re-ages. Callers that sort without a refresh get an order
//! that is stale by however long the jobs have waited since the last one.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::info;

use crate::aging::AgingPolicy;
use crate::batch::JobBatch;
use crate::clock::Clock;
use crate::dispatch;
use crate::engine::ExecutionEngine;
use crate::error::Result;
use crate::job::PriorityJob;
use crate::types::{Cloudlet, JobId};

/// Dispatch order: dynamic priority descending, then id ascending
pub fn dispatch_order(a: &PriorityJob, b: &PriorityJob) -> Ordering {
    b.dynamic_priority()
        .partial_cmp(&a.dynamic_priority())
        .unwrap_or_else(|| b.dynamic_priority().total_cmp(&a.dynamic_priority()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sort jobs into dispatch order in place
pub fn sort_by_priority(jobs: &mut [PriorityJob]) {
    jobs.sort_by(dispatch_order);
}

/// Ages batches against a clock and dispatches them in priority order
pub struct PriorityScheduler {
    policy: Box<dyn AgingPolicy>,
    clock: Arc<dyn Clock>,
}

impl PriorityScheduler {
    pub fn new(policy: Box<dyn AgingPolicy>, clock: Arc<dyn Clock>) -> Self {
        PriorityScheduler { policy, clock }
    }

    pub fn policy(&self) -> &dyn AgingPolicy {
        self.policy.as_ref()
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Assemble a batch whose jobs all arrive now
    pub fn assemble(&self, entries: &[(JobId, f64)]) -> Result<JobBatch> {
        JobBatch::assemble(entries, self.clock.now(), self.policy.as_ref())
    }

    /// Re-age every job in the batch as of now
    pub fn refresh(&self, batch: &mut JobBatch) -> Result<()> {
        batch.refresh_all(self.clock.now(), self.policy.as_ref())
    }

    /// Re-age one job as of now
    pub fn refresh_job(&self, batch: &mut JobBatch, id: JobId) -> Result<()> {
        batch.refresh_job(id, self.clock.now(), self.policy.as_ref())
    }

    /// Age the batch once, then return its jobs in dispatch order
    pub fn age_and_sort(&self, mut batch: JobBatch) -> Result<Vec<PriorityJob>> {
        self.refresh(&mut batch)?;
        Ok(batch.into_sorted())
    }

    /// Sort the batch as currently aged and submit the matching cloudlets
    ///
    /// Nothing is submitted unless every job and cloudlet pair up 1:1.
    pub fn dispatch<E: ExecutionEngine + ?Sized>(
        &self,
        batch: &JobBatch,
        cloudlets: &[Cloudlet],
        engine: &mut E,
    ) -> Result<Vec<Cloudlet>> {
        let sorted = batch.sorted();
        info!(
            jobs = sorted.len(),
            policy = self.policy.name(),
            engine = engine.name(),
            "Dispatching batch in priority order"
        );
        dispatch::dispatch(engine, &sorted, cloudlets)
    }
}
