//! Dispatch sequencing
//!
//! Translates a sorted job sequence into the submission order of the
//! payloads those jobs track. The payloads are borrowed, never owned: the
//! engine's objects stay where the caller put them, and the sequence handed
//! to the engine holds references in dispatch order.
//!
//! Either the whole batch is sequenced or nothing is. A job without a
//! payload, a payload without a job, or two payloads sharing an id all
//! abort before the engine sees anything.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::engine::ExecutionEngine;
use crate::error::{PriorityError, Result};
use crate::job::PriorityJob;
use crate::types::{Cloudlet, JobId};

/// A payload correlated to a job by id
pub trait Keyed {
    fn job_id(&self) -> JobId;
}

impl Keyed for Cloudlet {
    fn job_id(&self) -> JobId {
        self.id
    }
}

/// Index payloads by id, rejecting duplicates
fn index_payloads<P: Keyed>(payloads: &[P]) -> Result<HashMap<JobId, &P>> {
    let mut by_id = HashMap::with_capacity(payloads.len());
    for payload in payloads {
        if by_id.insert(payload.job_id(), payload).is_some() {
            return Err(PriorityError::DuplicatePayload {
                id: payload.job_id(),
            });
        }
    }
    Ok(by_id)
}

/// Payloads in the same relative order as `sorted`
///
/// Fails with [`PriorityError::Lookup`] on the first job with no payload.
pub fn sequence<'a, P: Keyed>(sorted: &[PriorityJob], payloads: &'a [P]) -> Result<Vec<&'a P>> {
    let by_id = index_payloads(payloads)?;

    sorted
        .iter()
        .map(|job| {
            by_id.get(&job.id()).copied().ok_or_else(|| {
                warn!(job_id = job.id(), "Sorted job has no payload");
                PriorityError::Lookup { id: job.id() }
            })
        })
        .collect()
}

/// Check that jobs and payloads pair up 1:1 by id
pub fn verify_correspondence<P: Keyed>(jobs: &[PriorityJob], payloads: &[P]) -> Result<()> {
    let by_id = index_payloads(payloads)?;

    if let Some(job) = jobs.iter().find(|job| !by_id.contains_key(&job.id())) {
        return Err(PriorityError::Lookup { id: job.id() });
    }

    let job_ids: HashSet<JobId> = jobs.iter().map(|job| job.id()).collect();
    if let Some(payload) = payloads.iter().find(|p| !job_ids.contains(&p.job_id())) {
        return Err(PriorityError::UnmatchedPayload {
            id: payload.job_id(),
        });
    }

    Ok(())
}

/// Sequence the cloudlets by `sorted` and submit them to `engine`
///
/// The engine is only invoked once the full 1:1 correspondence has been
/// verified; its own errors are returned unmodified.
pub fn dispatch<E: ExecutionEngine + ?Sized>(
    engine: &mut E,
    sorted: &[PriorityJob],
    cloudlets: &[Cloudlet],
) -> Result<Vec<Cloudlet>> {
    verify_correspondence(sorted, cloudlets)?;
    let ordered = sequence(sorted, cloudlets)?;

    info!(
        engine = engine.name(),
        cloudlets = ordered.len(),
        "Submitting ordered batch"
    );
    Ok(engine.submit(&ordered)?)
}
