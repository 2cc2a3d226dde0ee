//! Core types shared by the scheduler and the execution engine

use serde::{Deserialize, Serialize};

/// Identity correlating a job to its payload
pub type JobId = u64;

/// Lifecycle status of a cloudlet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CloudletStatus {
    #[default]
    Created,
    Queued,
    Success,
    Failed,
}

impl CloudletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudletStatus::Created => "Created",
            CloudletStatus::Queued => "Queued",
            CloudletStatus::Success => "Success",
            CloudletStatus::Failed => "Failed",
        }
    }
}

/// A unit of work executed by the engine (the payload a job tracks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloudlet {
    pub id: JobId,
    pub length: u64,       // Execution length (million instructions)
    pub pes_number: u32,   // Processing elements required
    pub file_size: u64,    // Input size (program + data)
    pub output_size: u64,  // Output size in bytes

    // Filled in by the engine after execution
    pub status: CloudletStatus,
    pub vm_id: Option<u64>,
    pub datacenter_id: Option<u64>,
    pub exec_start_time: Option<f64>,
    pub finish_time: Option<f64>,
}

impl Cloudlet {
    pub fn new(id: JobId, length: u64, pes_number: u32, file_size: u64, output_size: u64) -> Self {
        Cloudlet {
            id,
            length,
            pes_number,
            file_size,
            output_size,
            status: CloudletStatus::Created,
            vm_id: None,
            datacenter_id: None,
            exec_start_time: None,
            finish_time: None,
        }
    }

    /// CPU time actually consumed, once the engine has finished the cloudlet
    pub fn actual_cpu_time(&self) -> Option<f64> {
        match (self.exec_start_time, self.finish_time) {
            (Some(start), Some(finish)) => Some(finish - start),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == CloudletStatus::Success
    }
}

/// Shape of the cloudlets generated for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudletTemplate {
    pub length: u64,
    pub pes_number: u32,
    pub file_size: u64,
    pub output_size: u64,
}

impl Default for CloudletTemplate {
    fn default() -> Self {
        CloudletTemplate {
            length: 250_000,
            pes_number: 1,
            file_size: 300,
            output_size: 300,
        }
    }
}

impl CloudletTemplate {
    pub fn build(&self, id: JobId) -> Cloudlet {
        Cloudlet::new(id, self.length, self.pes_number, self.file_size, self.output_size)
    }
}

/// A virtual machine offered by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmSpec {
    pub id: u64,
    pub mips: f64,          // Million instructions per second
    pub pes_number: u32,
    pub ram_mb: u32,
    pub bw: u64,
    pub image_size_mb: u64,
    pub vmm: String,
}

impl VmSpec {
    /// Create a VM with the default single-core Xen profile
    pub fn new(id: u64, mips: f64) -> Self {
        VmSpec {
            id,
            mips,
            pes_number: 1,
            ram_mb: 512,
            bw: 1000,
            image_size_mb: 10_000,
            vmm: "Xen".to_string(),
        }
    }
}
