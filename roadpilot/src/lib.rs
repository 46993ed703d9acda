//! RoadPilot - driving companion core
//!
//! Live speed and speed-limit tracking with over-limit and hazard alerts,
//! concurrent multi-profile route computation, and handoff of the chosen
//! route to an external navigator.
//!
//! # Modules
//!
//! - [`telemetry`]: location samples in, display state and tones out
//! - [`speed_limit`]: debounced, cached speed-limit lookups
//! - [`alert`]: over-limit and hazard state machine
//! - [`routes`]: per-profile route requests, aggregation and formatting
//! - [`handoff`] / [`history`]: acting on a chosen route
//! - [`provider`]: Overpass and Google Routes clients over a pluggable HTTP client
//! - [`config`] / [`logging`]: ambient setup for the CLI

pub mod alert;
pub mod clock;
pub mod config;
pub mod coord;
pub mod handoff;
pub mod history;
pub mod logging;
pub mod notice;
pub mod provider;
pub mod routes;
pub mod speed_limit;
pub mod telemetry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
