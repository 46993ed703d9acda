//! Wall-clock abstraction.
//!
//! Components that stamp records with the current time take a [`Clock`]
//! instead of calling the system clock directly, so tests can pin time.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, TimeZone, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_millis(&self) -> i64;

    /// Current time as a local `DateTime`, for display formatting.
    fn now_local(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.now_millis())
            .single()
            .unwrap_or_else(|| Utc::now().with_timezone(&Local))
    }
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `millis`.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute value.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);

        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_trait_object_usage() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(0));
        assert_eq!(clock.now_millis(), 0);
        assert_eq!(clock.now_local().timestamp_millis(), 0);
    }
}
