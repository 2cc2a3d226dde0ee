//! Priority Simulation Engine
//!
//! Priority-aging scheduler for cloudlet batches. Each job gets a static
//! level, ages while it waits, and the batch is handed to an execution
//! engine in descending dynamic-priority order.
//!
//! ## Flow
//!
//! ```text
//! (id, level) ─► JobBatch ─► refresh ─► sort ─► sequence payloads ─► engine
//! ```
//!
//! See [`aging`] for the priority formula, [`scheduler`] for the ordering
//! rules and [`dispatch`] for the submission contract.

pub mod aging;
pub mod batch;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod job;
pub mod queue;
pub mod report;
pub mod scheduler;
pub mod simulation;
pub mod types;

pub use aging::{AgingPolicy, LinearAging, NoAging};
pub use batch::JobBatch;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SimulationConfig;
pub use engine::{ExecutionEngine, LoopbackBroker};
pub use error::{EngineError, PriorityError, Result};
pub use job::PriorityJob;
pub use queue::AgingQueue;
pub use scheduler::PriorityScheduler;
pub use simulation::Simulation;
pub use types::{Cloudlet, CloudletStatus, JobId, VmSpec};
