//! Recently navigated destinations.

mod entry;
mod store;

pub use entry::{
    format_display_date, CappedHistory, HistoryEntry, DEFAULT_HISTORY_CAPACITY,
    DISPLAY_DATE_FORMAT,
};
pub use store::{HistoryError, HistoryStore, JsonFileHistoryStore, MemoryHistoryStore};
