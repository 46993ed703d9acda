//! Route selection handoff
//!
//! Once the user picks a route, the destination is recorded in history and
//! passed to an external navigator for turn-by-turn guidance.

mod navigator;
mod selection;

pub use navigator::{
    render_uri, CommandNavigator, Destination, HandoffError, Navigator,
    DEFAULT_NAVIGATOR_COMMAND, DEFAULT_URI_TEMPLATE,
};
pub use selection::SelectionHandoff;
