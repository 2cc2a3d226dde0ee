//! Time sources for aging
//!
//! Aging needs "now" at batch assembly and at every refresh. Production runs
//! read the wall clock; tests and simulated runs drive a [`ManualClock`].

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{PriorityError, Result};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward (or backward, for a negative delta)
    ///
    /// Fails without moving if the result is outside the representable range.
    pub fn advance(&self, delta: TimeDelta) -> Result<()> {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        let current = *now;
        *now = current.checked_add_signed(delta).ok_or_else(|| {
            PriorityError::invalid_input(format!(
                "advancing clock at {} by {}ms overflows",
                current,
                delta.num_milliseconds()
            ))
        })?;
        Ok(())
    }

    /// Move the clock forward by a std duration
    pub fn advance_by(&self, duration: Duration) -> Result<()> {
        let delta = TimeDelta::from_std(duration).map_err(|_| {
            PriorityError::invalid_input(format!("duration {duration:?} is out of range"))
        })?;
        self.advance(delta)
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
