//! Interval gate for debouncing outbound queries.
//!
//! The gate does not read any clock. Callers pass the current time in
//! milliseconds (for the speed-limit lookup, the sample timestamp), which
//! keeps it deterministic under test.

/// Admits an action only when more than `min_interval_ms` has passed since
/// the last admitted one.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    min_interval_ms: i64,
    last_admitted_ms: Option<i64>,
}

impl IntervalGate {
    pub fn new(min_interval_ms: i64) -> Self {
        Self {
            min_interval_ms,
            last_admitted_ms: None,
        }
    }

    /// Returns true, and records `now_ms`, if the interval has elapsed.
    ///
    /// The first call always passes. Timestamps that move backwards never
    /// pass.
    pub fn try_admit(&mut self, now_ms: i64) -> bool {
        if let Some(last) = self.last_admitted_ms {
            if now_ms.saturating_sub(last) <= self.min_interval_ms {
                return false;
            }
        }
        self.last_admitted_ms = Some(now_ms);
        true
    }

    /// Time of the last admitted action.
    pub fn last_admitted(&self) -> Option<i64> {
        self.last_admitted_ms
    }

    pub fn min_interval_ms(&self) -> i64 {
        self.min_interval_ms
    }

    /// Forgets the last admission so the next call passes.
    pub fn reset(&mut self) {
        self.last_admitted_ms = None;
    }
}
