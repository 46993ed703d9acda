//! Acting on a chosen route.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::history::{HistoryEntry, HistoryStore};
use crate::routes::RouteResult;

use super::navigator::{Destination, HandoffError, Navigator};

/// Records the destination in history, then hands it to the navigator.
pub struct SelectionHandoff {
    history: Arc<dyn HistoryStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
}

impl SelectionHandoff {
    pub fn new(history: Arc<dyn HistoryStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_clock(history, navigator, Arc::new(SystemClock))
    }

    pub fn with_clock(
        history: Arc<dyn HistoryStore>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            history,
            navigator,
            clock,
        }
    }

    /// Handles the user picking `result` for `destination`.
    ///
    /// A history write failure is logged and does not stop the handoff.
    /// Navigator errors are returned as-is; nothing is retried.
    pub fn on_route_selected(
        &self,
        result: &RouteResult,
        destination: &Destination,
    ) -> Result<(), HandoffError> {
        info!(
            destination = %destination.name,
            profile = %result.label,
            duration_seconds = result.duration_seconds,
            "Route selected"
        );

        let entry = HistoryEntry::now(destination.name.clone(), destination.position, self.clock.as_ref());
        if let Err(e) = self.history.record(entry) {
            warn!(error = %e, destination = %destination.name, "Failed to record history");
        }

        self.navigator.navigate(destination)
    }
}
