//! Aging policies
//!
//! An aging policy turns a job's static level and the time it has spent
//! waiting into a single dynamic priority. Two policies are provided:
//!
//! - **Linear**: `level * scale + wait_ms * level / normalization`. Static
//!   level dominates among fresh jobs; waiting jobs gain priority in
//!   proportion to their level, so low levels cannot starve forever.
//! - **NoAging**: `level * scale`. Baseline for comparing against
//!   static-priority ordering.
//!
//! Policies are pure and evaluated per job; there is no batch-wide
//! normalization.

use chrono::TimeDelta;

use crate::error::{PriorityError, Result};

/// Weight of the static level in the dynamic priority
pub const DEFAULT_SCALE: f64 = 100.0;

/// Milliseconds of waiting that add one level's worth of priority
pub const DEFAULT_NORMALIZATION_MS: f64 = 1000.0;

/// Aging policy trait
pub trait AgingPolicy: Send + Sync {
    /// Dynamic priority for a job of `static_level` that has waited `wait_elapsed`
    ///
    /// Must be non-decreasing in `wait_elapsed` for a fixed level and strictly
    /// increasing in `static_level` for a fixed wait.
    fn priority(&self, static_level: f64, wait_elapsed: TimeDelta) -> Result<f64>;

    /// Get policy name
    fn name(&self) -> &str;
}

/// Reject inputs that indicate a clock or construction bug upstream
fn check_inputs(static_level: f64, wait_elapsed: TimeDelta) -> Result<f64> {
    if !static_level.is_finite() {
        return Err(PriorityError::invalid_input(format!(
            "static level must be finite, got {static_level}"
        )));
    }
    if wait_elapsed < TimeDelta::zero() {
        return Err(PriorityError::invalid_input(format!(
            "wait elapsed must be non-negative, got {}ms",
            wait_elapsed.num_milliseconds()
        )));
    }
    Ok(wait_elapsed.num_milliseconds() as f64)
}

fn check_constant(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PriorityError::invalid_input(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

/// Linear aging: priority grows with wait in proportion to the static level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAging {
    scale: f64,
    normalization_ms: f64,
}

impl LinearAging {
    pub fn new(scale: f64, normalization_ms: f64) -> Result<Self> {
        check_constant("scale", scale)?;
        check_constant("normalization", normalization_ms)?;
        Ok(LinearAging {
            scale,
            normalization_ms,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn normalization_ms(&self) -> f64 {
        self.normalization_ms
    }

    /// Wait a job of level `low` needs to tie a fresh job of level `high`
    ///
    /// Returns `None` when the lower level never gains priority by waiting,
    /// or when either level is not finite.
    pub fn crossover_wait(&self, low: f64, high: f64) -> Option<TimeDelta> {
        if !low.is_finite() || !high.is_finite() {
            return None;
        }
        if high <= low {
            return Some(TimeDelta::zero());
        }
        if low <= 0.0 {
            return None;
        }
        let wait_ms = (high - low) * self.scale * self.normalization_ms / low;
        Some(TimeDelta::milliseconds(wait_ms.ceil() as i64))
    }
}

impl Default for LinearAging {
    fn default() -> Self {
        LinearAging {
            scale: DEFAULT_SCALE,
            normalization_ms: DEFAULT_NORMALIZATION_MS,
        }
    }
}

impl AgingPolicy for LinearAging {
    fn priority(&self, static_level: f64, wait_elapsed: TimeDelta) -> Result<f64> {
        let wait_ms = check_inputs(static_level, wait_elapsed)?;
        // Non-positive levels do not age; waiting must never lower a priority.
        let aging = wait_ms * static_level.max(0.0) / self.normalization_ms;
        Ok(static_level * self.scale + aging)
    }

    fn name(&self) -> &str {
        "Linear"
    }
}

/// Baseline: static level only, waiting has no effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoAging {
    scale: f64,
}

impl NoAging {
    pub fn new(scale: f64) -> Result<Self> {
        check_constant("scale", scale)?;
        Ok(NoAging { scale })
    }
}

impl Default for NoAging {
    fn default() -> Self {
        NoAging {
            scale: DEFAULT_SCALE,
        }
    }
}

impl AgingPolicy for NoAging {
    fn priority(&self, static_level: f64, wait_elapsed: TimeDelta) -> Result<f64> {
        check_inputs(static_level, wait_elapsed)?;
        Ok(static_level * self.scale)
    }

    fn name(&self) -> &str {
        "NoAging"
    }
}
