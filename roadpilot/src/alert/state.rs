//! Over-limit and hazard alert state.

use tracing::{debug, info};

use crate::coord::LatLng;

use super::hazard::{Hazard, HazardClassifier, HazardInput};
use super::sink::Tone;

/// Over-limit alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Idle,
    Alerting,
}

/// A change produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    OverLimitEntered { speed_kph: u32, limit_kph: u32 },
    OverLimitCleared,
    HazardShown(Hazard),
    HazardReplaced { previous: Hazard, current: Hazard },
    HazardCleared(Hazard),
}

impl AlertEvent {
    /// Tone to play for this event, if any.
    pub fn tone(&self) -> Option<Tone> {
        match self {
            AlertEvent::OverLimitEntered { .. } => Some(Tone::OverLimit),
            AlertEvent::HazardShown(_) => Some(Tone::Hazard),
            AlertEvent::OverLimitCleared
            | AlertEvent::HazardReplaced { .. }
            | AlertEvent::HazardCleared(_) => None,
        }
    }
}

/// Tracks the over-limit alert and the visible hazard across evaluations.
///
/// Each condition sounds once when it starts. Staying over the limit, or
/// seeing the same hazard again, produces no event. A different hazard
/// replacing a visible one updates the banner silently. Dropping back to or
/// below the limit clears the alert immediately.
pub struct HazardAlertStateMachine {
    state: AlertState,
    visible_hazard: Option<Hazard>,
    classifier: Box<dyn HazardClassifier>,
}

impl HazardAlertStateMachine {
    pub fn new(classifier: Box<dyn HazardClassifier>) -> Self {
        Self {
            state: AlertState::Idle,
            visible_hazard: None,
            classifier,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn visible_hazard(&self) -> Option<&Hazard> {
        self.visible_hazard.as_ref()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Evaluates one reading and returns the resulting changes, over-limit
    /// first.
    pub fn evaluate(&mut self, speed_kph: u32, limit_kph: u32, position: LatLng) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        match (self.state, speed_kph > limit_kph) {
            (AlertState::Idle, true) => {
                self.state = AlertState::Alerting;
                info!(speed_kph, limit_kph, "Over speed limit");
                events.push(AlertEvent::OverLimitEntered {
                    speed_kph,
                    limit_kph,
                });
            }
            (AlertState::Alerting, false) => {
                self.state = AlertState::Idle;
                debug!(speed_kph, limit_kph, "Back within speed limit");
                events.push(AlertEvent::OverLimitCleared);
            }
            _ => {}
        }

        let current = self.classifier.classify(&HazardInput {
            speed_kph,
            position,
        });

        match (self.visible_hazard.take(), current) {
            (None, Some(hazard)) => {
                info!(hazard = %hazard, "Hazard shown");
                events.push(AlertEvent::HazardShown(hazard.clone()));
                self.visible_hazard = Some(hazard);
            }
            (Some(previous), Some(hazard)) if previous != hazard => {
                info!(previous = %previous, hazard = %hazard, "Hazard replaced");
                events.push(AlertEvent::HazardReplaced {
                    previous,
                    current: hazard.clone(),
                });
                self.visible_hazard = Some(hazard);
            }
            (Some(previous), Some(_)) => {
                self.visible_hazard = Some(previous);
            }
            (Some(previous), None) => {
                debug!(hazard = %previous, "Hazard cleared");
                events.push(AlertEvent::HazardCleared(previous));
            }
            (None, None) => {}
        }

        events
    }

    /// Returns to Idle with no hazard shown, without emitting events.
    pub fn reset(&mut self) {
        self.state = AlertState::Idle;
        self.visible_hazard = None;
    }
}

impl std::fmt::Debug for HazardAlertStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardAlertStateMachine")
            .field("state", &self.state)
            .field("visible_hazard", &self.visible_hazard)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}
