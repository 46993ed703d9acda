//! History entries and the capped, newest-first list that holds them.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::coord::LatLng;

/// Number of destinations kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// `strftime` pattern for [`HistoryEntry::display_date`].
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %H:%M";

/// Formats a timestamp the way history entries show it.
pub fn format_display_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format(DISPLAY_DATE_FORMAT).to_string()
}

/// A destination the user navigated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub recorded_at_millis: i64,
    pub display_date: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HistoryEntry {
    /// Creates an entry stamped with the clock's current time.
    pub fn now(name: impl Into<String>, position: LatLng, clock: &dyn Clock) -> Self {
        Self {
            name: name.into(),
            recorded_at_millis: clock.now_millis(),
            display_date: format_display_date(&clock.now_local()),
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Newest-first list that drops its oldest entry once full.
#[derive(Debug, Clone, PartialEq)]
pub struct CappedHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for CappedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CappedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wraps already-ordered entries, dropping any past `capacity`.
    pub fn from_entries(mut entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        entries.truncate(capacity);
        Self { entries, capacity }
    }

    /// Inserts at the front and evicts from the back.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{FixedOffset, Utc};

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry {
            name: name.to_string(),
            recorded_at_millis: 0,
            display_date: String::new(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn test_display_date_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(format_display_date(&at), "07 Mar 09:05");

        let istanbul = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(format_display_date(&at.with_timezone(&istanbul)), "07 Mar 12:05");
    }

    #[test]
    fn test_entry_from_clock() {
        let clock = ManualClock::new(1_709_802_300_000);
        let e = HistoryEntry::now("Galata", LatLng::new(41.0256, 28.9742), &clock);
        assert_eq!(e.recorded_at_millis, 1_709_802_300_000);
        assert_eq!(e.position(), LatLng::new(41.0256, 28.9742));
        assert_eq!(e.display_date, format_display_date(&clock.now_local()));
    }

    #[test]
    fn test_newest_first() {
        let mut history = CappedHistory::default();
        history.push(entry("a"));
        history.push(entry("b"));
        let names: Vec<&str> = history.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut history = CappedHistory::default();
        for i in 0..11 {
            history.push(entry(&format!("place-{}", i)));
        }

        assert_eq!(history.len(), 10);
        assert_eq!(history.entries()[0].name, "place-10");
        assert_eq!(history.entries()[9].name, "place-1");
        assert!(history.entries().iter().all(|e| e.name != "place-0"));
    }

    #[test]
    fn test_from_entries_truncates() {
        let entries: Vec<HistoryEntry> = (0..15).map(|i| entry(&i.to_string())).collect();
        let history = CappedHistory::from_entries(entries, 10);
        assert_eq!(history.len(), 10);
        assert_eq!(history.entries()[0].name, "0");
    }

    #[test]
    fn test_clear() {
        let mut history = CappedHistory::new(3);
        history.push(entry("a"));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 3);
    }
}
