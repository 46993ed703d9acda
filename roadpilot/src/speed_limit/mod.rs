//! Speed limit lookup
//!
//! Debounced queries to a [`SpeedLimitProvider`](crate::provider::SpeedLimitProvider)
//! for the road the vehicle is on, with the result cached until a newer one
//! arrives. Lookups run on background tasks; the caller only ever reads the
//! cached value.

mod cache;
mod gate;
mod lookup;
mod parse;

pub use cache::{LimitOrdering, SpeedLimitCache};
pub use gate::IntervalGate;
pub use lookup::{
    SpeedLimitConfig, SpeedLimitLookup, SpeedLimitQuery, SpeedLimitUpdate, DEFAULT_DEBOUNCE_MS,
    DEFAULT_LOOKUP_TIMEOUT, DEFAULT_SPEED_LIMIT_KPH,
};
pub use parse::{first_tagged_limit, parse_speed_limit};
