//! External provider abstraction
//!
//! This module provides traits and HTTP implementations for the two
//! providers the core consumes:
//!
//! - [`SpeedLimitProvider`]: tagged road elements near a point
//!   ([`OverpassClient`])
//! - [`RouteProvider`]: candidate routes for one request profile
//!   ([`GoogleRoutesClient`])
//!
//! Both sit on top of [`AsyncHttpClient`] so tests can inject canned
//! responses.
//!
//! ```ignore
//! use roadpilot::provider::{GoogleRoutesClient, OverpassClient, ReqwestClient};
//!
//! let http = ReqwestClient::new()?;
//! let limits = OverpassClient::new(http.clone());
//! let routes = GoogleRoutesClient::new(http, api_key);
//! ```

mod google_routes;
mod http;
mod overpass;
mod types;

pub use google_routes::{
    GoogleRoutesClient, RouteProvider, DEFAULT_ROUTES_ENDPOINT, ROUTES_FIELD_MASK,
};
pub use http::{AsyncHttpClient, ReqwestClient};
pub use overpass::{
    OverpassClient, SpeedLimitProvider, DEFAULT_OVERPASS_ENDPOINT, DEFAULT_SEARCH_RADIUS_METERS,
};
pub use types::{BoxFuture, ProviderError};

#[cfg(test)]
pub use http::tests::{MockHttpClient, RecordedRequest};
