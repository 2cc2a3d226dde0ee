//! Continuously aged job queue
//!
//! For live queues fed by several producers. The batch sits behind a
//! `RwLock`: arrivals and refreshes take the write lock, so a sort never
//! observes a half-refreshed batch, and readers get a consistent snapshot.
//!
//! A refresh recomputes every job's priority before committing any of them
//! (see [`JobBatch::refresh_all`]). A background task can repeat the refresh
//! on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::aging::AgingPolicy;
use crate::batch::JobBatch;
use crate::clock::Clock;
use crate::error::Result;
use crate::job::PriorityJob;
use crate::types::JobId;

/// Default interval between background refreshes (milliseconds)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;

/// Shared queue of waiting jobs
pub struct AgingQueue {
    batch: Arc<RwLock<JobBatch>>,
    policy: Arc<dyn AgingPolicy>,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
}

impl AgingQueue {
    pub fn new(policy: Arc<dyn AgingPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            batch: Arc::new(RwLock::new(JobBatch::new())),
            policy,
            clock,
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
        }
    }

    /// Set the background refresh interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Add a job arriving now
    pub async fn enqueue(&self, id: JobId, static_level: f64) -> Result<()> {
        let job = PriorityJob::new(id, static_level, self.clock.now(), self.policy.as_ref())?;
        self.batch.write().await.push(job)?;
        debug!(job_id = id, static_level, "Enqueued job");
        Ok(())
    }

    /// Re-age every queued job as of now
    pub async fn refresh(&self) -> Result<()> {
        let mut batch = self.batch.write().await;
        let now = self.clock.now();
        batch.refresh_all(now, self.policy.as_ref())
    }

    /// Queued jobs in dispatch order, as last refreshed
    pub async fn snapshot_sorted(&self) -> Vec<PriorityJob> {
        self.batch.read().await.sorted()
    }

    /// Remove every queued job, returning them in dispatch order
    pub async fn drain_sorted(&self) -> Vec<PriorityJob> {
        let batch = std::mem::take(&mut *self.batch.write().await);
        info!(jobs = batch.len(), "Drained queue");
        batch.into_sorted()
    }

    pub async fn len(&self) -> usize {
        self.batch.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batch.read().await.is_empty()
    }

    /// Start a background task that periodically re-ages the queue
    pub fn start_refresh_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = self.refresh_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;

                match self.refresh().await {
                    Ok(()) => debug!("Refreshed queue priorities"),
                    Err(e) => warn!(error = %e, "Failed to refresh queue priorities"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::LinearAging;
    use crate::clock::ManualClock;
    use crate::error::PriorityError;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn queue() -> (Arc<ManualClock>, AgingQueue) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        let queue = AgingQueue::new(Arc::new(LinearAging::default()), clock.clone());
        (clock, queue)
    }

    #[tokio::test]
    async fn test_enqueue_and_snapshot() {
        let (clock, queue) = queue();

        queue.enqueue(0, 1.0).await.unwrap();
        clock.advance(TimeDelta::milliseconds(1000)).unwrap();
        queue.enqueue(1, 2.0).await.unwrap();

        let snapshot = queue.snapshot_sorted().await;
        let ids: Vec<JobId> = snapshot.iter().map(|job| job.id()).collect();
        assert_eq!(ids, vec![1, 0]);
        assert_eq!(queue.len().await, 2);
    }

    #[tokio::test]
    async fn test_refresh_lets_waiting_job_overtake() {
        let (clock, queue) = queue();

        queue.enqueue(0, 1.0).await.unwrap();
        clock.advance(TimeDelta::milliseconds(500_000)).unwrap();
        queue.enqueue(1, 5.0).await.unwrap();

        // Before refresh the snapshot is stale
        assert_eq!(queue.snapshot_sorted().await[0].id(), 1);

        queue.refresh().await.unwrap();
        let snapshot = queue.snapshot_sorted().await;
        assert_eq!(snapshot[0].id(), 0);
        assert_eq!(snapshot[0].dynamic_priority(), 600.0);
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_rejected() {
        let (_clock, queue) = queue();

        queue.enqueue(3, 1.0).await.unwrap();
        let err = queue.enqueue(3, 2.0).await.unwrap_err();

        assert!(matches!(err, PriorityError::DuplicateJob { id: 3 }));
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_clock_running_backwards_rejected() {
        let (clock, queue) = queue();

        queue.enqueue(0, 1.0).await.unwrap();
        clock.advance(TimeDelta::milliseconds(-10)).unwrap();

        let err = queue.refresh().await.unwrap_err();
        assert!(matches!(err, PriorityError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_drain_empties_queue() {
        let (_clock, queue) = queue();

        queue.enqueue(0, 1.0).await.unwrap();
        queue.enqueue(1, 3.0).await.unwrap();

        let drained = queue.drain_sorted().await;

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].id(), 1);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_background_refresh() {
        let (clock, queue) = queue();
        let queue = Arc::new(queue.with_refresh_interval(Duration::from_millis(5)));

        queue.enqueue(0, 2.0).await.unwrap();
        clock.advance(TimeDelta::milliseconds(3000)).unwrap();

        let handle = queue.clone().start_refresh_task();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        let snapshot = queue.snapshot_sorted().await;
        assert_eq!(snapshot[0].dynamic_priority(), 206.0);
        assert_eq!(snapshot[0].wait_elapsed(), TimeDelta::milliseconds(3000));
    }
}
