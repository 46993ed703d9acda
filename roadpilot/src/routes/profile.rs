//! Named route request profiles.
//!
//! A profile fixes the travel mode, routing preference and route modifiers
//! of one request. The engine issues one independent request per profile.

use std::fmt;

/// Travel mode understood by the route provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelMode {
    Drive,
    Walk,
    Bicycle,
    TwoWheeler,
}

impl TravelMode {
    /// Wire value used by the Routes API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TravelMode::Drive => "DRIVE",
            TravelMode::Walk => "WALK",
            TravelMode::Bicycle => "BICYCLE",
            TravelMode::TwoWheeler => "TWO_WHEELER",
        }
    }

    /// Only motorised modes accept a routing preference.
    pub fn supports_routing_preference(&self) -> bool {
        matches!(self, TravelMode::Drive | TravelMode::TwoWheeler)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// How much live traffic the provider should take into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingPreference {
    TrafficUnaware,
    TrafficAware,
    TrafficAwareOptimal,
}

impl RoutingPreference {
    /// Wire value used by the Routes API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            RoutingPreference::TrafficUnaware => "TRAFFIC_UNAWARE",
            RoutingPreference::TrafficAware => "TRAFFIC_AWARE",
            RoutingPreference::TrafficAwareOptimal => "TRAFFIC_AWARE_OPTIMAL",
        }
    }
}

/// One named route request variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteRequestProfile {
    /// Label shown next to the result (e.g. "fastest").
    pub label: String,
    pub travel_mode: TravelMode,
    pub routing_preference: Option<RoutingPreference>,
    pub avoid_tolls: bool,
    pub avoid_highways: bool,
    pub avoid_ferries: bool,
}

impl RouteRequestProfile {
    /// Creates a profile with no route modifiers.
    pub fn new(label: impl Into<String>, travel_mode: TravelMode) -> Self {
        Self {
            label: label.into(),
            travel_mode,
            routing_preference: None,
            avoid_tolls: false,
            avoid_highways: false,
            avoid_ferries: false,
        }
    }

    /// Traffic-aware driving, tolls allowed.
    pub fn fastest() -> Self {
        Self::new("fastest", TravelMode::Drive)
            .with_routing_preference(RoutingPreference::TrafficAware)
    }

    /// Traffic-aware driving that avoids toll roads.
    pub fn toll_free() -> Self {
        Self::new("toll-free", TravelMode::Drive)
            .with_routing_preference(RoutingPreference::TrafficAware)
            .with_avoid_tolls(true)
    }

    /// The fixed set issued for every destination pick.
    pub fn defaults() -> Vec<Self> {
        vec![Self::fastest(), Self::toll_free()]
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_routing_preference(mut self, preference: RoutingPreference) -> Self {
        self.routing_preference = Some(preference);
        self
    }

    pub fn with_avoid_tolls(mut self, avoid: bool) -> Self {
        self.avoid_tolls = avoid;
        self
    }

    pub fn with_avoid_highways(mut self, avoid: bool) -> Self {
        self.avoid_highways = avoid;
        self
    }

    pub fn with_avoid_ferries(mut self, avoid: bool) -> Self {
        self.avoid_ferries = avoid;
        self
    }

    /// True when any route modifier is set.
    pub fn has_modifiers(&self) -> bool {
        self.avoid_tolls || self.avoid_highways || self.avoid_ferries
    }

    /// Routing preference to send, dropped for modes that reject it.
    pub fn effective_routing_preference(&self) -> Option<RoutingPreference> {
        self.routing_preference
            .filter(|_| self.travel_mode.supports_routing_preference())
    }
}
