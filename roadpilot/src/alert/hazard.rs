//! Hazard classification.
//!
//! A classifier looks at the current speed and position and names at most one
//! hazard. The state machine decides whether that is news.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::LatLng;

/// Category of a road hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    SchoolZone,
    SpeedBump,
    Custom,
}

impl HazardKind {
    /// Message shown when none is configured.
    pub fn default_message(&self) -> &'static str {
        match self {
            HazardKind::SchoolZone => "Okul Bölgesi",
            HazardKind::SpeedBump => "Kasis Var",
            HazardKind::Custom => "Dikkat",
        }
    }
}

/// A hazard to show the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub message: String,
}

impl Hazard {
    pub fn new(kind: HazardKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn school_zone() -> Self {
        Self::new(HazardKind::SchoolZone, HazardKind::SchoolZone.default_message())
    }

    pub fn speed_bump() -> Self {
        Self::new(HazardKind::SpeedBump, HazardKind::SpeedBump.default_message())
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a classifier gets to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardInput {
    pub speed_kph: u32,
    pub position: LatLng,
}

/// Decides which hazard, if any, applies right now.
pub trait HazardClassifier: Send + Sync {
    fn classify(&self, input: &HazardInput) -> Option<Hazard>;

    /// Short name for logs and config.
    fn name(&self) -> &str;
}

/// Never reports a hazard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHazards;

impl HazardClassifier for NoHazards {
    fn classify(&self, _input: &HazardInput) -> Option<Hazard> {
        None
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Demo classifier keyed on exact speed: 30 kph reports a school zone and
/// 45 kph a speed bump.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSpeedClassifier;

impl HazardClassifier for ReferenceSpeedClassifier {
    fn classify(&self, input: &HazardInput) -> Option<Hazard> {
        match input.speed_kph {
            30 => Some(Hazard::school_zone()),
            45 => Some(Hazard::speed_bump()),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "reference"
    }
}

/// A circular hazard area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub kind: HazardKind,
    #[serde(default)]
    pub message: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

impl HazardZone {
    pub fn new(kind: HazardKind, center: LatLng, radius_meters: f64) -> Self {
        Self {
            kind,
            message: None,
            latitude: center.latitude,
            longitude: center.longitude,
            radius_meters,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn contains(&self, position: LatLng) -> bool {
        self.center().distance_meters(&position) <= self.radius_meters
    }

    pub fn hazard(&self) -> Hazard {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| self.kind.default_message().to_string());
        Hazard::new(self.kind, message)
    }
}

/// Errors loading a zone file.
#[derive(Debug, Error)]
pub enum ZoneFileError {
    #[error("failed to read zone file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse zone file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reports the nearest zone containing the position.
#[derive(Debug, Clone, Default)]
pub struct GeofenceClassifier {
    zones: Vec<HazardZone>,
}

impl GeofenceClassifier {
    pub fn new(zones: Vec<HazardZone>) -> Self {
        Self { zones }
    }

    /// Loads zones from a JSON array of [`HazardZone`].
    pub fn from_json_file(path: &Path) -> Result<Self, ZoneFileError> {
        let data = fs::read_to_string(path)?;
        let zones: Vec<HazardZone> = serde_json::from_str(&data)?;
        Ok(Self::new(zones))
    }

    pub fn zones(&self) -> &[HazardZone] {
        &self.zones
    }
}

impl HazardClassifier for GeofenceClassifier {
    fn classify(&self, input: &HazardInput) -> Option<Hazard> {
        self.zones
            .iter()
            .filter(|z| z.contains(input.position))
            .min_by(|a, b| {
                let da = a.center().distance_meters(&input.position);
                let db = b.center().distance_meters(&input.position);
                da.total_cmp(&db)
            })
            .map(HazardZone::hazard)
    }

    fn name(&self) -> &str {
        "geofence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn input(speed_kph: u32, position: LatLng) -> HazardInput {
        HazardInput {
            speed_kph,
            position,
        }
    }

    #[test]
    fn test_reference_classifier() {
        let c = ReferenceSpeedClassifier;
        let here = LatLng::new(0.0, 0.0);
        assert_eq!(c.classify(&input(30, here)), Some(Hazard::school_zone()));
        assert_eq!(c.classify(&input(45, here)), Some(Hazard::speed_bump()));
        assert_eq!(c.classify(&input(31, here)), None);
        assert_eq!(c.classify(&input(0, here)), None);
        assert_eq!(Hazard::speed_bump().to_string(), "Kasis Var");
    }

    #[test]
    fn test_no_hazards() {
        assert_eq!(NoHazards.classify(&input(30, LatLng::new(0.0, 0.0))), None);
    }

    #[test]
    fn test_geofence_contains() {
        let school = LatLng::new(41.0, 29.0);
        let classifier = GeofenceClassifier::new(vec![HazardZone::new(
            HazardKind::SchoolZone,
            school,
            150.0,
        )]);

        // ~111 m north
        let near = LatLng::new(41.001, 29.0);
        // ~1.1 km north
        let far = LatLng::new(41.01, 29.0);

        assert_eq!(
            classifier.classify(&input(50, near)),
            Some(Hazard::school_zone())
        );
        assert_eq!(classifier.classify(&input(50, far)), None);
    }

    #[test]
    fn test_geofence_picks_nearest_zone() {
        let classifier = GeofenceClassifier::new(vec![
            HazardZone::new(HazardKind::SchoolZone, LatLng::new(41.0, 29.0), 500.0),
            HazardZone::new(HazardKind::SpeedBump, LatLng::new(41.002, 29.0), 500.0)
                .with_message("Bump ahead"),
        ]);

        let hazard = classifier
            .classify(&input(40, LatLng::new(41.0019, 29.0)))
            .unwrap();
        assert_eq!(hazard, Hazard::new(HazardKind::SpeedBump, "Bump ahead"));
    }

    #[test]
    fn test_zone_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"kind":"speed_bump","latitude":41.0,"longitude":29.0,"radius_meters":30}},
               {{"kind":"custom","message":"Sharp bend","latitude":40.0,"longitude":28.0,"radius_meters":80}}]"#
        )
        .unwrap();

        let classifier = GeofenceClassifier::from_json_file(file.path()).unwrap();
        assert_eq!(classifier.zones().len(), 2);
        assert_eq!(classifier.zones()[1].hazard().message, "Sharp bend");
    }

    #[test]
    fn test_zone_file_errors() {
        let missing = GeofenceClassifier::from_json_file(Path::new("/nonexistent/zones.json"));
        assert!(matches!(missing, Err(ZoneFileError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let bad = GeofenceClassifier::from_json_file(file.path());
        assert!(matches!(bad, Err(ZoneFileError::Parse(_))));
    }
}
