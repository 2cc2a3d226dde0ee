//! Error types for the priority scheduler

use thiserror::Error;

use crate::types::JobId;

/// Scheduler result type
pub type Result<T> = std::result::Result<T, PriorityError>;

/// Failure reported by an execution engine
///
/// The scheduler never interprets these; they are surfaced to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Engine has no VM to bind cloudlets to
    #[error("No VMs available for cloudlet binding")]
    NoVms,

    /// Engine rejected the submission
    #[error("Submission rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur while aging, sorting or dispatching a batch
#[derive(Error, Debug)]
pub enum PriorityError {
    /// A sorted job has no matching payload
    #[error("No payload found for job {id}")]
    Lookup { id: JobId },

    /// Negative wait, non-finite level or bad policy constants
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two jobs in one batch share an id
    #[error("Duplicate job id {id} in batch")]
    DuplicateJob { id: JobId },

    /// Two payloads share an id
    #[error("Duplicate payload id {id}")]
    DuplicatePayload { id: JobId },

    /// A payload has no job tracking its priority
    #[error("Payload {id} has no matching job")]
    UnmatchedPayload { id: JobId },

    /// Refresh requested for a job that is not in the batch
    #[error("Job {id} not found in batch")]
    UnknownJob { id: JobId },

    /// Execution engine failure
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PriorityError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
