//! RoadPilot CLI - Command-line interface
//!
//! Replays a location stream through the speed-limit and hazard alerts, and
//! computes route options for handoff to an external navigator.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roadpilot::coord::LatLng;

use commands::config::ConfigCommands;
use commands::drive::DriveArgs;
use commands::history::HistoryArgs;
use commands::routes::RoutesArgs;

#[derive(Parser)]
#[command(name = "roadpilot")]
#[command(about = "Speed limit alerts and route options for drivers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration file at ~/.roadpilot/config.ini
    Init,

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Replay a recorded location stream with live speed-limit alerts
    Drive {
        /// JSON-lines file of location samples
        #[arg(long)]
        replay: PathBuf,

        /// Pace samples by their timestamps instead of replaying at once
        #[arg(long)]
        realtime: bool,
    },

    /// Compute route options and start navigation to the chosen one
    Routes {
        /// Origin as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        from: LatLng,

        /// Destination as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        to: LatLng,

        /// Destination name shown in history
        #[arg(long)]
        name: Option<String>,

        /// Pick option N (1-based) without prompting
        #[arg(long)]
        select: Option<usize>,

        /// Routes API key (overrides config)
        #[arg(long, env = "ROADPILOT_API_KEY")]
        api_key: Option<String>,
    },

    /// Show recent destinations
    History {
        /// Remove every entry
        #[arg(long)]
        clear: bool,

        /// Do not ask for confirmation when clearing
        #[arg(long, short = 'y', requires = "clear")]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Drive { replay, realtime } => commands::drive::run(DriveArgs { replay, realtime }),
        Commands::Routes {
            from,
            to,
            name,
            select,
            api_key,
        } => commands::routes::run(RoutesArgs {
            from,
            to,
            name,
            select,
            api_key,
        }),
        Commands::History { clear, yes } => commands::history::run(HistoryArgs { clear, yes }),
    };

    if let Err(e) = result {
        e.exit();
    }
}
