//! Last known speed limit.

use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;

/// Which of several overlapping responses is allowed to update the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitOrdering {
    /// The last response to complete wins, regardless of when it was issued.
    #[default]
    LastCompleted,
    /// Responses issued before the one currently applied are discarded.
    LatestIssued,
}

impl LimitOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitOrdering::LastCompleted => "last-completed",
            LimitOrdering::LatestIssued => "latest-issued",
        }
    }
}

impl fmt::Display for LimitOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-completed" | "last_completed" => Ok(LimitOrdering::LastCompleted),
            "latest-issued" | "latest_issued" => Ok(LimitOrdering::LatestIssued),
            other => Err(format!(
                "unknown ordering '{}', expected last-completed or latest-issued",
                other
            )),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    limit_kph: Option<u32>,
    applied_sequence: Option<u64>,
}

/// Most recently resolved speed limit, with no expiry.
///
/// Shared between the lookup tasks that write it and the telemetry loop
/// that reads it.
#[derive(Debug, Default)]
pub struct SpeedLimitCache {
    ordering: LimitOrdering,
    state: Mutex<CacheState>,
}

impl SpeedLimitCache {
    pub fn new(ordering: LimitOrdering) -> Self {
        Self {
            ordering,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ordering(&self) -> LimitOrdering {
        self.ordering
    }

    /// Current limit, if any response has resolved one.
    pub fn get(&self) -> Option<u32> {
        self.state.lock().limit_kph
    }

    /// Stores `limit_kph` from the query with issuance number `sequence`.
    ///
    /// Returns false if the ordering policy rejected it as stale.
    pub fn apply(&self, sequence: u64, limit_kph: u32) -> bool {
        let mut state = self.state.lock();
        if self.ordering == LimitOrdering::LatestIssued {
            if let Some(applied) = state.applied_sequence {
                if sequence < applied {
                    return false;
                }
            }
        }
        state.limit_kph = Some(limit_kph);
        state.applied_sequence = Some(sequence);
        true
    }
}
