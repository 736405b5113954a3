use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::{Error, Result};

/// A point in time as seen by the replacer. The unit is up to
/// the clock, the replacer only compares and subtracts them.
pub type Timestamp = u64;

/// Source of access timestamps for the replacer.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Microseconds elapsed since the clock was created. Consecutive
/// reads are strictly increasing, two reads that fall into the same
/// microsecond are pushed apart by one.
#[derive(Debug)]
pub struct MonotonicClock {
    epoch: Instant,
    last: AtomicU64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock { epoch: Instant::now(), last: AtomicU64::new(0) }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.epoch.elapsed().as_micros() as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = elapsed.max(prev + 1);
            match self.last.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// A logical clock, every read returns the current tick and then
/// moves one tick forward.
#[derive(Debug, Default)]
pub struct LogicalClock {
    tick: AtomicU64,
}

impl LogicalClock {
    pub fn new(start: Timestamp) -> Self {
        LogicalClock { tick: AtomicU64::new(start) }
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Timestamp {
        self.tick.fetch_add(1, Ordering::SeqCst)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock { time: AtomicU64::new(start) }
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }

    /// Move the clock forward and return the new time. The clock never
    /// wraps, an advance past `Timestamp::MAX` fails and leaves it as is.
    pub fn advance(&self, delta: u64) -> Result<Timestamp> {
        let mut prev = self.time.load(Ordering::SeqCst);
        loop {
            let Some(next) = prev.checked_add(delta) else {
                return Err(Error::Value(format!(
                    "clock overflow advancing {} by {}",
                    prev, delta
                )));
            };
            match self.time.compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Ok(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
