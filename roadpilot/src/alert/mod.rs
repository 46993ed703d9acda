//! Over-limit and hazard alerts
//!
//! [`HazardAlertStateMachine`] turns a stream of speed/limit/position
//! readings into [`AlertEvent`]s, each of which may carry a [`Tone`] for an
//! [`AlertSink`] to play. Hazards come from a pluggable
//! [`HazardClassifier`].

mod hazard;
mod sink;
mod state;

pub use hazard::{
    GeofenceClassifier, Hazard, HazardClassifier, HazardInput, HazardKind, HazardZone, NoHazards,
    ReferenceSpeedClassifier, ZoneFileError,
};
pub use sink::{AlertSink, RecordingSink, SilentSink, TerminalBellSink, Tone};
pub use state::{AlertEvent, AlertState, HazardAlertStateMachine};
