//! Geographic coordinate types
//!
//! Provides the WGS84 position type shared by telemetry, route requests,
//! hazard zones and the navigator handoff, plus great-circle distance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius used for haversine distance.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors produced when building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid coordinate pair '{0}' (expected LAT,LNG)")]
    InvalidFormat(String),
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    /// Creates a position without range validation.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a position, rejecting out-of-range values.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_meters(&self, other: &LatLng) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for LatLng {
    type Err = CoordError;

    /// Parses `"LAT,LNG"` (whitespace around either number is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordError::InvalidFormat(s.to_string()))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::InvalidFormat(s.to_string()))?;
        let longitude: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoordError::InvalidFormat(s.to_string()))?;

        Self::checked(latitude, longitude)
    }
}
