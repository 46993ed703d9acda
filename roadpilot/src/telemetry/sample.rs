//! Location samples and the events that carry them.

use serde::{Deserialize, Serialize};

use crate::coord::LatLng;

/// One position fix from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in meters per second.
    #[serde(default)]
    pub speed_mps: f64,
    /// Heading in degrees clockwise from north.
    #[serde(default)]
    pub bearing_degrees: f64,
    /// Fix time in milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, speed_mps: f64, timestamp_millis: i64) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            bearing_degrees: 0.0,
            timestamp_millis,
        }
    }

    pub fn with_bearing(mut self, bearing_degrees: f64) -> Self {
        self.bearing_degrees = bearing_degrees;
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// What the location provider delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// One or more fixes, oldest first.
    Samples(Vec<LocationSample>),
    /// The user has not granted location access.
    PermissionDenied,
}
