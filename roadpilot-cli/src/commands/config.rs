//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` for
//! viewing and modifying `~/.roadpilot/config.ini` from the command line.

use clap::Subcommand;
use roadpilot::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., speed_limit.debounce_ms)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., routes.api_key)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'roadpilot config list' to see available keys.",
            key
        ))
    })
}

/// Mask secrets for display, keeping the last four characters.
fn display_value(key: ConfigKey, value: &str) -> String {
    if key != ConfigKey::RoutesApiKey || value.chars().count() <= 4 {
        return value.to_string();
    }
    let tail: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key.set(&mut config, value)?;
    config.save()?;

    println!(
        "Set {} = {}",
        config_key.name(),
        display_value(config_key, &config_key.get(&config))
    );

    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), display_value(*key, &value));
        }
    }

    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_masked() {
        assert_eq!(
            display_value(ConfigKey::RoutesApiKey, "AIzaSecret1234"),
            "****1234"
        );
        assert_eq!(display_value(ConfigKey::RoutesApiKey, "abc"), "abc");
        assert_eq!(
            display_value(ConfigKey::RoutesLocale, "tr-TR-long"),
            "tr-TR-long"
        );
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        assert!(matches!(parse_key("nope.nothing"), Err(CliError::Config(_))));
        assert!(parse_key("history.capacity").is_ok());
    }
}
