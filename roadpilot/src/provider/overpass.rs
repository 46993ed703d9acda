//! Overpass API speed-limit provider.
//!
//! Looks up `maxspeed` tags on ways within a small radius of a point using
//! the Overpass QL interpreter endpoint:
//!
//! ```text
//! GET {endpoint}/api/interpreter?data=[out:json];way[maxspeed](around:20,LAT,LON);out tags;
//! ```
//!
//! The response is a list of elements in provider order, each optionally
//! carrying free-text tags. Only the raw `maxspeed` strings are returned
//! here; choosing and parsing them is the lookup's job.

use serde::Deserialize;

use crate::coord::LatLng;
use crate::provider::{AsyncHttpClient, BoxFuture, ProviderError};

/// Public Overpass instance.
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de";

/// Search radius around the current position, in meters.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 20;

/// Source of tagged speed-limit elements around a position.
pub trait SpeedLimitProvider: Send + Sync + 'static {
    /// Returns the `maxspeed` tag of every element near `position`, in the
    /// order the provider listed them. Elements without the tag yield `None`.
    fn fetch_maxspeed_tags(
        &self,
        position: LatLng,
    ) -> BoxFuture<'_, Result<Vec<Option<String>>, ProviderError>>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Option<Vec<OverpassElement>>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: Option<OverpassTags>,
}

#[derive(Debug, Deserialize)]
struct OverpassTags {
    #[serde(default)]
    maxspeed: Option<String>,
}

/// Speed-limit provider backed by an Overpass interpreter.
pub struct OverpassClient<C: AsyncHttpClient> {
    http_client: C,
    endpoint: String,
    radius_meters: u32,
}

impl<C: AsyncHttpClient> OverpassClient<C> {
    /// Creates a client for the public Overpass instance.
    pub fn new(http_client: C) -> Self {
        Self::with_endpoint(http_client, DEFAULT_OVERPASS_ENDPOINT)
    }

    /// Creates a client for a specific Overpass instance.
    pub fn with_endpoint(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }

    /// Sets the search radius in meters.
    pub fn with_radius(mut self, radius_meters: u32) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Builds the Overpass QL query for a position.
    fn build_query(&self, position: LatLng) -> String {
        format!(
            "[out:json];way[maxspeed](around:{},{},{});out tags;",
            self.radius_meters, position.latitude, position.longitude
        )
    }

    fn interpreter_url(&self) -> String {
        format!("{}/api/interpreter", self.endpoint)
    }
}

fn decode_tags(body: &[u8]) -> Result<Vec<Option<String>>, ProviderError> {
    let response: OverpassResponse = serde_json::from_slice(body)?;
    Ok(response
        .elements
        .unwrap_or_default()
        .into_iter()
        .map(|element| element.tags.and_then(|tags| tags.maxspeed))
        .collect())
}

impl<C: AsyncHttpClient> SpeedLimitProvider for OverpassClient<C> {
    fn fetch_maxspeed_tags(
        &self,
        position: LatLng,
    ) -> BoxFuture<'_, Result<Vec<Option<String>>, ProviderError>> {
        Box::pin(async move {
            let url = self.interpreter_url();
            let query = [("data", self.build_query(position))];
            let body = self.http_client.get(&url, &query).await?;
            decode_tags(&body)
        })
    }

    fn name(&self) -> &str {
        "Overpass"
    }
}
