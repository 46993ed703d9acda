//! Init command - initialize configuration file.

use dialoguer::Input;
use roadpilot::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;

    if config.routes.api_key.is_none() {
        config.routes.api_key = prompt_api_key()?;
    } else {
        println!("Routes API key already configured.");
        println!();
    }

    config.save()?;

    let path = config_file_path();
    println!("Configuration file: {}", path.display());
    println!("History file:       {}", config.history.file.display());
    println!("Log directory:      {}", config.logging.directory.display());
    println!();
    println!("Edit this file or use 'roadpilot config set' to customize settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

/// Ask for the Routes API key. Skipped when stdin is not a terminal.
fn prompt_api_key() -> Result<Option<String>, CliError> {
    if !console::user_attended() {
        println!("No Routes API key configured.");
        println!("Set one later with 'roadpilot config set routes.api_key <KEY>'.");
        println!();
        return Ok(None);
    }

    let key: String = Input::new()
        .with_prompt("Routes API key (Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::Input(e.to_string()))?;
    println!();

    let key = key.trim();
    if key.is_empty() {
        println!("Skipped. The 'routes' command needs a key.");
        println!();
        Ok(None)
    } else {
        Ok(Some(key.to_string()))
    }
}
