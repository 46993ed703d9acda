//! Helpers shared across CLI commands.

use std::sync::Arc;

use console::style;
use roadpilot::config::ConfigFile;
use roadpilot::handoff::{HandoffError, SelectionHandoff};
use roadpilot::notice::Notice;
use roadpilot::provider::{GoogleRoutesClient, OverpassClient, ReqwestClient};
use roadpilot::routes::{CostLabel, RouteOption};

use crate::error::CliError;

/// Resolve the Routes API key: CLI flag first, then config.
pub fn require_api_key(cli_key: Option<String>, config: &ConfigFile) -> Result<String, CliError> {
    cli_key
        .or_else(|| config.routes.api_key.clone())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            CliError::Config(
                "No Routes API key. Use --api-key or run \
                 'roadpilot config set routes.api_key <KEY>'."
                    .to_string(),
            )
        })
}

pub fn overpass_client(config: &ConfigFile, http: ReqwestClient) -> OverpassClient<ReqwestClient> {
    OverpassClient::with_endpoint(http, &config.speed_limit.endpoint)
        .with_radius(config.speed_limit.radius_meters)
}

pub fn routes_client(
    config: &ConfigFile,
    http: ReqwestClient,
    api_key: String,
) -> GoogleRoutesClient<ReqwestClient> {
    GoogleRoutesClient::with_endpoint(http, api_key, &config.routes.endpoint)
}

pub fn selection_handoff(config: &ConfigFile) -> SelectionHandoff {
    SelectionHandoff::new(config.history_store(), Arc::new(config.navigator()))
}

/// One line of the route list: `[n] label  duration • distance  cost`.
pub fn format_option_line(index: usize, option: &RouteOption) -> String {
    let cost = match &option.cost {
        CostLabel::Free(text) => style(text.as_str()).green().to_string(),
        CostLabel::Toll(text) => style(text.as_str()).yellow().to_string(),
    };
    format!(
        "[{}] {:<10} {}  {}",
        index,
        style(&option.label).bold(),
        option.details(),
        cost
    )
}

/// Print a handoff failure the way the user should see it.
pub fn report_handoff_error(error: &HandoffError) {
    if let HandoffError::NavigatorUnavailable(_) = error {
        eprintln!("{}", style(Notice::NavigatorUnavailable).red().bold());
    }
}
