//! Job batches
//!
//! A batch owns the priority jobs for one submission. Ids are unique for the
//! batch's lifetime, and refreshing the whole batch is all-or-nothing: new
//! priorities are computed for every job before any job is updated.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::aging::AgingPolicy;
use crate::error::{PriorityError, Result};
use crate::job::PriorityJob;
use crate::scheduler::sort_by_priority;
use crate::types::JobId;

/// Jobs assembled together and dispatched as one ordered submission
#[derive(Debug, Clone, Default)]
pub struct JobBatch {
    jobs: Vec<PriorityJob>,
    ids: HashSet<JobId>,
}

impl JobBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one job per `(id, static_level)` entry, all arriving at `now`
    pub fn assemble(
        entries: &[(JobId, f64)],
        now: DateTime<Utc>,
        policy: &dyn AgingPolicy,
    ) -> Result<Self> {
        let mut batch = JobBatch::new();
        for &(id, level) in entries {
            batch.push(PriorityJob::new(id, level, now, policy)?)?;
        }

        info!(jobs = batch.len(), policy = policy.name(), "Assembled job batch");
        Ok(batch)
    }

    /// Add a job, rejecting an id already used in this batch
    pub fn push(&mut self, job: PriorityJob) -> Result<()> {
        if !self.ids.insert(job.id()) {
            warn!(job_id = job.id(), "Rejected duplicate job id");
            return Err(PriorityError::DuplicateJob { id: job.id() });
        }
        self.jobs.push(job);
        Ok(())
    }

    pub fn jobs(&self) -> &[PriorityJob] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&PriorityJob> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.ids.contains(&id)
    }

    /// Re-age every job as of `now`
    ///
    /// If any job fails to age, no job is updated.
    pub fn refresh_all(&mut self, now: DateTime<Utc>, policy: &dyn AgingPolicy) -> Result<()> {
        let aged = self
            .jobs
            .iter()
            .map(|job| job.aged_at(now, policy))
            .collect::<Result<Vec<_>>>()?;

        for (job, (wait, priority)) in self.jobs.iter_mut().zip(aged) {
            job.apply(wait, priority);
        }
        Ok(())
    }

    /// Re-age a single job as of `now`
    pub fn refresh_job(
        &mut self,
        id: JobId,
        now: DateTime<Utc>,
        policy: &dyn AgingPolicy,
    ) -> Result<()> {
        let job = self
            .jobs
            .iter_mut()
            .find(|job| job.id() == id)
            .ok_or(PriorityError::UnknownJob { id })?;
        job.refresh(now, policy)
    }

    /// Jobs in dispatch order, leaving the batch as assembled
    pub fn sorted(&self) -> Vec<PriorityJob> {
        let mut jobs = self.jobs.clone();
        sort_by_priority(&mut jobs);
        jobs
    }

    /// Consume the batch, returning its jobs in dispatch order
    pub fn into_sorted(self) -> Vec<PriorityJob> {
        let mut jobs = self.jobs;
        sort_by_priority(&mut jobs);
        jobs
    }
}
