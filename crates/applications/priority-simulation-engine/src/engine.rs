//! Execution engine interface
//!
//! The scheduler hands an ordered batch to an engine and gets completed
//! cloudlets back. What the engine does in between (VM placement, timing,
//! cost accounting) is the engine's business; the scheduler only guarantees
//! the submission order.
//!
//! [`LoopbackBroker`] is an in-process engine for the CLI and tests. It
//! binds cloudlets to VMs round-robin in submission order and runs each VM's
//! cloudlets back to back, which is enough to make the dispatch order
//! visible in the results. It is not an execution model.

use tracing::debug;

use crate::error::EngineError;
use crate::types::{Cloudlet, CloudletStatus, JobId, VmSpec};

/// Engine that accepts an ordered batch of cloudlets
pub trait ExecutionEngine {
    /// Submit the batch in the given order and run it to completion
    fn submit(&mut self, ordered: &[&Cloudlet]) -> Result<Vec<Cloudlet>, EngineError>;

    /// Get engine name
    fn name(&self) -> &str;
}

/// In-process broker that records what it was given
pub struct LoopbackBroker {
    vms: Vec<VmSpec>,
    datacenter_id: u64,
    submitted: Vec<JobId>,
    submissions: usize,
}

impl LoopbackBroker {
    pub fn new(vms: Vec<VmSpec>) -> Self {
        LoopbackBroker {
            vms,
            datacenter_id: 2,
            submitted: Vec::new(),
            submissions: 0,
        }
    }

    pub fn with_datacenter_id(mut self, id: u64) -> Self {
        self.datacenter_id = id;
        self
    }

    pub fn vms(&self) -> &[VmSpec] {
        &self.vms
    }

    /// Ids of every cloudlet submitted so far, in submission order
    pub fn submitted_order(&self) -> &[JobId] {
        &self.submitted
    }

    /// Number of accepted submissions
    pub fn submissions(&self) -> usize {
        self.submissions
    }
}

impl ExecutionEngine for LoopbackBroker {
    fn submit(&mut self, ordered: &[&Cloudlet]) -> Result<Vec<Cloudlet>, EngineError> {
        if self.vms.is_empty() {
            return Err(EngineError::NoVms);
        }
        if let Some(vm) = self.vms.iter().find(|vm| !(vm.mips.is_finite() && vm.mips > 0.0)) {
            return Err(EngineError::Rejected(format!(
                "VM {} has non-positive MIPS {}",
                vm.id, vm.mips
            )));
        }

        // Time at which each VM becomes free
        let mut vm_ready = vec![0.0_f64; self.vms.len()];
        let mut completed = Vec::with_capacity(ordered.len());

        for (position, cloudlet) in ordered.iter().enumerate() {
            let slot = position % self.vms.len();
            let vm = &self.vms[slot];

            let start = vm_ready[slot];
            let finish = start + cloudlet.length as f64 / vm.mips;
            vm_ready[slot] = finish;

            let mut done = (*cloudlet).clone();
            done.status = CloudletStatus::Success;
            done.vm_id = Some(vm.id);
            done.datacenter_id = Some(self.datacenter_id);
            done.exec_start_time = Some(start);
            done.finish_time = Some(finish);

            debug!(
                cloudlet_id = done.id,
                vm_id = vm.id,
                start,
                finish,
                "Cloudlet finished"
            );
            completed.push(done);
        }

        self.submitted.extend(ordered.iter().map(|c| c.id));
        self.submissions += 1;

        // Received in completion order; stable sort keeps submission order on ties
        completed.sort_by(|a, b| {
            a.finish_time
                .unwrap_or_default()
                .total_cmp(&b.finish_time.unwrap_or_default())
        });
        Ok(completed)
    }

    fn name(&self) -> &str {
        "LoopbackBroker"
    }
}
