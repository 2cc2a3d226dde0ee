//! End-to-end run: assemble, stagger-refresh, sort and dispatch one batch
//!
//! Each job is refreshed once, in creation order, after waiting one more
//! refresh interval than the job before it. Later jobs therefore age
//! longer, which is what lets equal or slightly lower levels reorder.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::engine::{ExecutionEngine, LoopbackBroker};
use crate::error::Result;
use crate::report::{rows, RunReport};
use crate::scheduler::PriorityScheduler;

/// A configured run against a loopback broker
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Simulation { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the batch; `pause` is called once per job before its refresh
    ///
    /// `pause` must let `clock` move forward by the given duration: sleep for
    /// a wall clock, advance a manual clock.
    pub fn run(
        &self,
        clock: Arc<dyn Clock>,
        mut pause: impl FnMut(Duration) -> Result<()>,
    ) -> Result<RunReport> {
        let scheduler = PriorityScheduler::new(self.config.aging.build()?, clock);
        let cloudlets = self.config.cloudlets();
        let mut broker = LoopbackBroker::new(self.config.vm_specs());

        let mut batch = scheduler.assemble(&self.config.entries())?;

        let interval = Duration::from_millis(self.config.refresh_interval_ms);
        let ids: Vec<_> = batch.jobs().iter().map(|job| job.id()).collect();
        for id in ids {
            pause(interval)?;
            scheduler.refresh_job(&mut batch, id)?;
        }

        let unsorted = rows(batch.jobs());
        let sorted = rows(&batch.sorted());
        let results = scheduler.dispatch(&batch, &cloudlets, &mut broker)?;

        info!(
            policy = scheduler.policy_name(),
            completed = results.iter().filter(|c| c.is_finished()).count(),
            total = results.len(),
            "Run complete"
        );

        Ok(RunReport {
            policy_name: scheduler.policy_name().to_string(),
            engine_name: broker.name().to_string(),
            unsorted,
            sorted,
            results,
        })
    }
}
