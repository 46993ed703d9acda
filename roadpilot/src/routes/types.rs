//! Route request and result types.

use crate::coord::LatLng;
use crate::provider::ProviderError;

use super::profile::RouteRequestProfile;

/// A single request sent to the route provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: LatLng,
    pub destination: LatLng,
    pub profile: RouteRequestProfile,
}

/// A monetary amount as returned by the provider.
///
/// The combined value is `units + nanos / 1e9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    /// ISO 4217 code (e.g. "TRY").
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }

    /// Combined value as a float.
    pub fn value(&self) -> f64 {
        self.units as f64 + self.nanos as f64 / 1_000_000_000.0
    }
}

/// One candidate route as decoded from the provider, before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateRoute {
    /// Duration string in protobuf form, e.g. `"5400s"`.
    pub duration: String,
    pub distance_meters: u64,
    /// Estimated toll prices, provider order.
    pub estimated_prices: Vec<Money>,
    pub route_labels: Vec<String>,
}

/// A validated route option for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Profile label that produced this route.
    pub label: String,
    pub duration_seconds: u64,
    pub distance_meters: u64,
    /// First entry of the provider's estimated toll prices, if any.
    pub toll_estimate: Option<Money>,
    /// Provider labels such as `DEFAULT_ROUTE`.
    pub route_labels: Vec<String>,
}

impl RouteResult {
    /// Builds a result from a provider candidate.
    ///
    /// Fails with [`ProviderError::Malformed`] when the duration string
    /// cannot be read.
    pub fn from_candidate(
        label: impl Into<String>,
        candidate: CandidateRoute,
    ) -> Result<Self, ProviderError> {
        let duration_seconds = parse_duration_seconds(&candidate.duration).ok_or_else(|| {
            ProviderError::Malformed(format!("unreadable duration '{}'", candidate.duration))
        })?;

        Ok(Self {
            label: label.into(),
            duration_seconds,
            distance_meters: candidate.distance_meters,
            toll_estimate: candidate.estimated_prices.into_iter().next(),
            route_labels: candidate.route_labels,
        })
    }

    /// True when the provider returned a toll price for this route.
    pub fn has_toll(&self) -> bool {
        self.toll_estimate.is_some()
    }
}

/// Parses a protobuf duration string (`"5400s"`, `"12.5s"`) into whole seconds.
///
/// Fractional seconds are truncated. Negative or non-numeric values yield `None`.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('s').unwrap_or(trimmed);

    if let Ok(whole) = number.parse::<u64>() {
        return Some(whole);
    }

    let fractional: f64 = number.parse().ok()?;
    if fractional.is_finite() && fractional >= 0.0 {
        Some(fractional as u64)
    } else {
        None
    }
}
