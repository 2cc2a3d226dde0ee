//! Priority metadata tracked for each cloudlet while it waits for dispatch

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::aging::AgingPolicy;
use crate::error::{PriorityError, Result};
use crate::types::JobId;

/// A waiting job: static level plus the priority it has aged into
///
/// `arrival_time` is fixed at construction. `wait_elapsed` and
/// `dynamic_priority` change only through [`PriorityJob::refresh`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityJob {
    id: JobId,
    static_level: f64,
    arrival_time: DateTime<Utc>,
    wait_elapsed: TimeDelta,
    dynamic_priority: f64,
}

impl PriorityJob {
    /// Create a job that arrived at `arrival_time`, aged to zero wait
    pub fn new(
        id: JobId,
        static_level: f64,
        arrival_time: DateTime<Utc>,
        policy: &dyn AgingPolicy,
    ) -> Result<Self> {
        let dynamic_priority = policy.priority(static_level, TimeDelta::zero())?;

        Ok(PriorityJob {
            id,
            static_level,
            arrival_time,
            wait_elapsed: TimeDelta::zero(),
            dynamic_priority,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn static_level(&self) -> f64 {
        self.static_level
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.arrival_time
    }

    pub fn wait_elapsed(&self) -> TimeDelta {
        self.wait_elapsed
    }

    pub fn dynamic_priority(&self) -> f64 {
        self.dynamic_priority
    }

    /// Compute what a refresh at `now` would produce, without applying it
    pub fn aged_at(
        &self,
        now: DateTime<Utc>,
        policy: &dyn AgingPolicy,
    ) -> Result<(TimeDelta, f64)> {
        let wait = now.signed_duration_since(self.arrival_time);
        if wait < TimeDelta::zero() {
            return Err(PriorityError::invalid_input(format!(
                "job {} refreshed at {} before its arrival at {}",
                self.id, now, self.arrival_time
            )));
        }
        let priority = policy.priority(self.static_level, wait)?;
        Ok((wait, priority))
    }

    /// Recompute wait and dynamic priority as of `now`
    ///
    /// On error the job is left untouched.
    pub fn refresh(&mut self, now: DateTime<Utc>, policy: &dyn AgingPolicy) -> Result<()> {
        let (wait, priority) = self.aged_at(now, policy)?;
        self.apply(wait, priority);
        Ok(())
    }

    pub(crate) fn apply(&mut self, wait: TimeDelta, priority: f64) {
        debug!(
            job_id = self.id,
            wait_ms = wait.num_milliseconds(),
            priority,
            "Aged job"
        );
        self.wait_elapsed = wait;
        self.dynamic_priority = priority;
    }
}
