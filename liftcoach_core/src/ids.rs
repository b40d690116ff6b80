//! Injectable identifier and time sources.
//!
//! The aggregate never calls `Uuid::new_v4()` or `Utc::now()` directly so
//! tests can replay a block with reproducible ids and timestamps.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use uuid::Uuid;

/// Source of unique entity identifiers
pub trait IdGenerator {
    fn next_id(&self) -> Uuid;
}

/// Random v4 UUIDs for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids counting up from a seed
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: Cell<u128>,
}

impl SequentialIds {
    pub fn new(start: u128) -> Self {
        Self {
            next: Cell::new(start),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        let value = self.next.get() + 1;
        self.next.set(value);
        Uuid::from_u128(value)
    }
}

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
