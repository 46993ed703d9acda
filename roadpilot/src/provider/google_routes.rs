//! Google Routes API provider.
//!
//! Computes routes with the Routes API v2 `computeRoutes` method. Requires a
//! Google Maps Platform API key with the Routes API enabled.
//!
//! # Request
//!
//! ```text
//! POST {endpoint}/directions/v2:computeRoutes
//! X-Goog-Api-Key: {key}
//! X-Goog-FieldMask: routes.duration,routes.distanceMeters,routes.travelAdvisory.tollInfo,routes.routeLabels
//! ```
//!
//! The field mask keeps responses small: only duration, distance, toll
//! advisory and labels are returned. Tolls are only estimated when the body
//! asks for the `TOLLS` extra computation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::coord::LatLng;
use crate::provider::{AsyncHttpClient, BoxFuture, ProviderError};
use crate::routes::{CandidateRoute, Money, RouteRequest};

/// Public Routes API host.
pub const DEFAULT_ROUTES_ENDPOINT: &str = "https://routes.googleapis.com";

/// Response fields requested from the provider.
pub const ROUTES_FIELD_MASK: &str =
    "routes.duration,routes.distanceMeters,routes.travelAdvisory.tollInfo,routes.routeLabels";

/// Source of candidate routes for a single request.
pub trait RouteProvider: Send + Sync + 'static {
    /// Returns candidate routes in provider order. An empty list means the
    /// provider found no route.
    fn compute_routes<'a>(
        &'a self,
        request: &'a RouteRequest,
    ) -> BoxFuture<'a, Result<Vec<CandidateRoute>, ProviderError>>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str;
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesBody<'a> {
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    routing_preference: Option<&'a str>,
    extra_computations: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    route_modifiers: Option<RouteModifiers>,
}

#[derive(Debug, Serialize)]
struct Waypoint {
    location: Location,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: WireLatLng,
}

#[derive(Debug, Serialize)]
struct WireLatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteModifiers {
    avoid_tolls: bool,
    avoid_highways: bool,
    avoid_ferries: bool,
}

impl From<LatLng> for Waypoint {
    fn from(pos: LatLng) -> Self {
        Self {
            location: Location {
                lat_lng: WireLatLng {
                    latitude: pos.latitude,
                    longitude: pos.longitude,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComputeRoutesResponse {
    #[serde(default)]
    routes: Option<Vec<WireRoute>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRoute {
    #[serde(default)]
    distance_meters: u64,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    travel_advisory: Option<TravelAdvisory>,
    #[serde(default)]
    route_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TravelAdvisory {
    #[serde(default)]
    toll_info: Option<TollInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TollInfo {
    #[serde(default)]
    estimated_price: Vec<WireMoney>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMoney {
    #[serde(default)]
    currency_code: String,
    /// int64 is encoded as a JSON string by the API; accept numbers too.
    #[serde(default, deserialize_with = "units_from_string_or_number")]
    units: i64,
    #[serde(default)]
    nanos: i32,
}

fn units_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Units {
        Number(i64),
        Text(String),
    }

    match Units::deserialize(deserializer)? {
        Units::Number(n) => Ok(n),
        Units::Text(s) => Ok(s.trim().parse().unwrap_or(0)),
    }
}

impl From<WireRoute> for CandidateRoute {
    fn from(route: WireRoute) -> Self {
        let estimated_prices = route
            .travel_advisory
            .and_then(|advisory| advisory.toll_info)
            .map(|toll| {
                toll.estimated_price
                    .into_iter()
                    .map(|m| Money::new(m.currency_code, m.units, m.nanos))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            duration: route.duration,
            distance_meters: route.distance_meters,
            estimated_prices,
            route_labels: route.route_labels,
        }
    }
}

/// Route provider backed by the Google Routes API.
pub struct GoogleRoutesClient<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
    endpoint: String,
}

impl<C: AsyncHttpClient> GoogleRoutesClient<C> {
    /// Creates a client for the public endpoint.
    pub fn new(http_client: C, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(http_client, api_key, DEFAULT_ROUTES_ENDPOINT)
    }

    /// Creates a client for a custom endpoint (proxies, tests).
    pub fn with_endpoint(
        http_client: C,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    fn compute_url(&self) -> String {
        format!("{}/directions/v2:computeRoutes", self.endpoint)
    }

    fn build_body(request: &RouteRequest) -> Result<Vec<u8>, ProviderError> {
        let profile = &request.profile;
        let body = ComputeRoutesBody {
            origin: request.origin.into(),
            destination: request.destination.into(),
            travel_mode: profile.travel_mode.as_api_str(),
            routing_preference: profile
                .effective_routing_preference()
                .map(|p| p.as_api_str()),
            extra_computations: ["TOLLS"],
            route_modifiers: profile.has_modifiers().then(|| RouteModifiers {
                avoid_tolls: profile.avoid_tolls,
                avoid_highways: profile.avoid_highways,
                avoid_ferries: profile.avoid_ferries,
            }),
        };

        serde_json::to_vec(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn decode_routes(body: &[u8]) -> Result<Vec<CandidateRoute>, ProviderError> {
    let response: ComputeRoutesResponse = serde_json::from_slice(body)?;
    Ok(response
        .routes
        .unwrap_or_default()
        .into_iter()
        .map(CandidateRoute::from)
        .collect())
}

impl<C: AsyncHttpClient> RouteProvider for GoogleRoutesClient<C> {
    fn compute_routes<'a>(
        &'a self,
        request: &'a RouteRequest,
    ) -> BoxFuture<'a, Result<Vec<CandidateRoute>, ProviderError>> {
        Box::pin(async move {
            let url = self.compute_url();
            let headers = [
                ("X-Goog-Api-Key", self.api_key.clone()),
                ("X-Goog-FieldMask", ROUTES_FIELD_MASK.to_string()),
            ];
            let body = Self::build_body(request)?;
            let response = self.http_client.post_json(&url, &headers, body).await?;
            decode_routes(&response)
        })
    }

    fn name(&self) -> &str {
        "Google Routes"
    }
}
