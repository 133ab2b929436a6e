//! Time source and id generation
//!
//! Ids are derived from the clock in milliseconds. Two calls within the same
//! millisecond (or a clock that steps backwards) would collide, so the
//! generator bumps each id to at least one past the previous one.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::MessageId;

/// Source of "now" for message dates and ids
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|t| *t).unwrap_or_else(|_| Utc::now())
    }
}

/// Monotonic, time-derived message ids
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never hand out an id at or below `id` (used after loading persisted data)
    pub fn observe(&self, id: MessageId) {
        self.last.fetch_max(id.value(), Ordering::SeqCst);
    }

    /// Next id for something created at `at`
    pub fn next(&self, at: DateTime<Utc>) -> MessageId {
        let candidate = at.timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        MessageId::new(candidate.max(prev.saturating_add(1)))
    }
}
