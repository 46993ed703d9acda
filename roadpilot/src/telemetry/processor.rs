//! Per-sample telemetry processing.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::alert::{AlertEvent, AlertState, Hazard, HazardAlertStateMachine};
use crate::coord::LatLng;
use crate::provider::SpeedLimitProvider;
use crate::speed_limit::SpeedLimitLookup;

use super::sample::LocationSample;

/// Zoom used when following the vehicle without an explicit request.
pub const DEFAULT_FOLLOW_ZOOM: f64 = 18.0;

/// Camera tilt while following, in degrees.
pub const FOLLOW_TILT_DEGREES: f64 = 45.0;

/// Converts a ground speed to whole km/h, truncating toward zero.
///
/// The result is unsigned, so this is not toward-zero truncation for
/// negative input: any negative speed clamps to 0 (-3 m/s gives 0, not
/// -10). NaN maps to 0 and values past `u32::MAX` saturate.
pub fn speed_kph(speed_mps: f64) -> u32 {
    (speed_mps * 3.6) as u32
}

/// Instruction to move the map camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDirective {
    pub target: LatLng,
    pub bearing_degrees: f64,
    pub zoom: f64,
    pub tilt_degrees: f64,
}

/// Lets the UI ask for the camera to snap back to the vehicle on the next
/// sample. Cloned handles share the same request slot.
#[derive(Debug, Clone, Default)]
pub struct RecenterHandle {
    pending: Arc<Mutex<Option<Option<f64>>>>,
}

impl RecenterHandle {
    /// Requests a recenter, optionally at a specific zoom.
    ///
    /// Only the latest request is kept; it is consumed by the next sample.
    pub fn request(&self, zoom: Option<f64>) {
        *self.pending.lock() = Some(zoom);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    fn take(&self) -> Option<Option<f64>> {
        self.pending.lock().take()
    }
}

/// Outcome of processing one sample or one limit change.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryUpdate {
    pub speed_kph: u32,
    pub limit_kph: u32,
    /// False while the limit is the configured default.
    pub limit_known: bool,
    pub query_issued: bool,
    pub alert_events: Vec<AlertEvent>,
    pub alert_state: AlertState,
    pub hazard: Option<Hazard>,
    pub camera: Option<CameraDirective>,
}

impl TelemetryUpdate {
    pub fn over_limit(&self) -> bool {
        self.alert_state == AlertState::Alerting
    }
}

/// Turns location samples into speed, limit and alert state.
///
/// Takes `&mut self`, so samples are processed one at a time in the order
/// they are passed in.
pub struct TelemetryProcessor<P: SpeedLimitProvider> {
    lookup: SpeedLimitLookup<P>,
    alerts: HazardAlertStateMachine,
    recenter: RecenterHandle,
    first_sample_seen: bool,
    last_speed_kph: Option<u32>,
    last_position: Option<LatLng>,
}

impl<P: SpeedLimitProvider> TelemetryProcessor<P> {
    pub fn new(lookup: SpeedLimitLookup<P>, alerts: HazardAlertStateMachine) -> Self {
        Self {
            lookup,
            alerts,
            recenter: RecenterHandle::default(),
            first_sample_seen: false,
            last_speed_kph: None,
            last_position: None,
        }
    }

    /// Handle for recenter requests from the UI.
    pub fn recenter_handle(&self) -> RecenterHandle {
        self.recenter.clone()
    }

    pub fn lookup(&self) -> &SpeedLimitLookup<P> {
        &self.lookup
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts.state()
    }

    pub fn last_speed_kph(&self) -> Option<u32> {
        self.last_speed_kph
    }

    /// Processes one sample. Must be called from within a tokio runtime,
    /// since it may start a speed-limit query.
    pub fn on_location(&mut self, sample: &LocationSample) -> TelemetryUpdate {
        let speed_kph = speed_kph(sample.speed_mps);
        let position = sample.position();
        self.last_speed_kph = Some(speed_kph);
        self.last_position = Some(position);

        let query_issued = self.lookup.maybe_query(sample);
        let camera = self.camera_directive(sample);

        trace!(
            speed_kph,
            lat = position.latitude,
            lon = position.longitude,
            query_issued,
            "Location processed"
        );

        let mut update = self.evaluate(speed_kph, position);
        update.query_issued = query_issued;
        update.camera = camera;
        update
    }

    /// Re-runs alert evaluation with the last known speed after the cached
    /// limit changed. Returns None before the first sample.
    pub fn on_limit_resolved(&mut self) -> Option<TelemetryUpdate> {
        let speed_kph = self.last_speed_kph?;
        let position = self.last_position?;
        debug!(
            speed_kph,
            limit_kph = self.lookup.effective_limit(),
            "Re-evaluating alerts for new limit"
        );
        Some(self.evaluate(speed_kph, position))
    }

    fn evaluate(&mut self, speed_kph: u32, position: LatLng) -> TelemetryUpdate {
        let cached = self.lookup.cached_limit();
        let limit_kph = self.lookup.effective_limit();
        let alert_events = self.alerts.evaluate(speed_kph, limit_kph, position);

        TelemetryUpdate {
            speed_kph,
            limit_kph,
            limit_known: cached.is_some(),
            query_issued: false,
            alert_events,
            alert_state: self.alerts.state(),
            hazard: self.alerts.visible_hazard().cloned(),
            camera: None,
        }
    }

    fn camera_directive(&mut self, sample: &LocationSample) -> Option<CameraDirective> {
        let requested = self.recenter.take();
        if self.first_sample_seen && requested.is_none() {
            return None;
        }
        self.first_sample_seen = true;

        Some(CameraDirective {
            target: sample.position(),
            bearing_degrees: sample.bearing_degrees,
            zoom: requested.flatten().unwrap_or(DEFAULT_FOLLOW_ZOOM),
            tilt_degrees: FOLLOW_TILT_DEGREES,
        })
    }
}
