//! Route computation
//!
//! Concurrent, per-profile route requests to the route provider, with
//! streaming aggregation and pure display formatting.
//!
//! ```ignore
//! use futures::StreamExt;
//! use roadpilot::routes::{FormatLocale, RouteComputationEngine, RouteOption, RouteRequestProfile};
//!
//! let mut session = engine.compute_routes(origin, destination, &RouteRequestProfile::defaults());
//! while let Some(result) = session.next().await {
//!     let option = RouteOption::new(&result, &FormatLocale::default());
//!     println!("{}  {}  {}", option.label, option.details(), option.cost.text());
//! }
//! ```

mod engine;
mod format;
mod profile;
mod types;

pub use engine::{
    rank_results, RouteComputationEngine, RouteEngineConfig, RouteSession, SessionToken,
    DEFAULT_ROUTE_TIMEOUT,
};
pub use format::{
    format_cost, format_distance, format_duration, format_money, CostLabel, FormatLocale,
    RouteOption,
};
pub use profile::{RouteRequestProfile, RoutingPreference, TravelMode};
pub use types::{parse_duration_seconds, CandidateRoute, Money, RouteRequest, RouteResult};
