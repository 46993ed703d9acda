//! Routes command - compute route options concurrently and hand the chosen
//! one to the external navigator.

use std::time::Duration;

use console::style;
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use roadpilot::coord::LatLng;
use roadpilot::handoff::Destination;
use roadpilot::routes::{
    FormatLocale, RouteComputationEngine, RouteOption, RouteRequestProfile, RouteResult,
};

use super::common::{
    format_option_line, report_handoff_error, require_api_key, routes_client, selection_handoff,
};
use crate::error::CliError;
use crate::runner::CliRunner;

pub struct RoutesArgs {
    pub from: LatLng,
    pub to: LatLng,
    pub name: Option<String>,
    pub select: Option<usize>,
    pub api_key: Option<String>,
}

/// Run the routes command.
pub fn run(args: RoutesArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("routes");
    let config = runner.config();

    let api_key = require_api_key(args.api_key.clone(), config)?;
    let http = runner.http_client(config.routes.timeout_secs)?;
    let engine = RouteComputationEngine::new(
        routes_client(config, http, api_key),
        config.route_engine_config(),
    );
    let locale = config.format_locale();
    let profiles = RouteRequestProfile::defaults();

    println!("Routes {} → {}", args.from, args.to);
    println!();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Requesting {} route options...", profiles.len()));

    let results: Vec<RouteResult> = runner.block_on(async {
        let mut session = engine.compute_routes(args.from, args.to, &profiles);
        let mut index = 0;
        while let Some(result) = session.next_result().await {
            index += 1;
            spinner.println(format_option_line(index, &RouteOption::new(&result, &locale)));
            let pending = session.pending_labels();
            if !pending.is_empty() {
                spinner.set_message(format!("Waiting for {}...", pending.join(", ")));
            }
        }
        session.results()
    });
    spinner.finish_and_clear();

    if results.is_empty() {
        println!("{}", style("No routes available.").red());
        return Ok(());
    }

    let Some(choice) = choose(&results, &locale, args.select)? else {
        println!("No route selected.");
        return Ok(());
    };

    let chosen = &results[choice];
    let name = args.name.unwrap_or_else(|| args.to.to_string());
    let destination = Destination::new(name, args.to);

    println!();
    println!("Starting navigation with {} to {}", style(&chosen.label).bold(), destination.name);

    let handoff = selection_handoff(config);
    if let Err(e) = handoff.on_route_selected(chosen, &destination) {
        report_handoff_error(&e);
        return Err(e.into());
    }
    Ok(())
}

/// Zero-based index of the chosen result, from `--select` (one-based) or an
/// interactive prompt. `None` when nothing is chosen.
fn choose(
    results: &[RouteResult],
    locale: &FormatLocale,
    select: Option<usize>,
) -> Result<Option<usize>, CliError> {
    if let Some(n) = select {
        return validate_selection(n, results.len()).map(Some);
    }

    if !console::user_attended() {
        println!("Use --select N to start navigation.");
        return Ok(None);
    }

    let items: Vec<String> = results
        .iter()
        .map(|r| {
            let option = RouteOption::new(r, locale);
            format!("{}  {}  {}", option.label, option.details(), option.cost.text())
        })
        .collect();

    Select::new()
        .with_prompt("Choose a route")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| CliError::Input(e.to_string()))
}

fn validate_selection(n: usize, available: usize) -> Result<usize, CliError> {
    if n == 0 || n > available {
        return Err(CliError::Input(format!(
            "--select {} is out of range (1-{})",
            n, available
        )));
    }
    Ok(n - 1)
}
