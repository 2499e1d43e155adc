// SPDX-License-Identifier: MIT

//! Clock abstraction for testable time handling.
//!
//! The engine stamps every section transition with an ISO-8601 UTC
//! timestamp (spec §3, §8 invariant 2). Threading a [`Clock`] through the
//! engine instead of calling `Utc::now()` directly lets tests assert strict
//! monotonicity without real sleeps.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// A source of the current wall-clock time.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Render `now()` the way the document model expects: ISO-8601, UTC, second precision.
    fn now_iso(&self) -> String {
        self.now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for tests with controllable, strictly-advancing time.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(start)) }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        *self.current.lock() += duration;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.current.lock() = at;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
        Self::new(start)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        // Every read advances by a tick so two transitions on the fake clock
        // never compare equal — mirrors real clock granularity without sleeps.
        let mut guard = self.current.lock();
        *guard += chrono::Duration::seconds(1);
        *guard
    }
}
