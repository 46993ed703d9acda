//! CLI error type.

use std::fmt;
use std::process;

use roadpilot::config::ConfigError;
use roadpilot::handoff::HandoffError;
use roadpilot::history::HistoryError;
use roadpilot::logging::LoggingError;
use roadpilot::provider::ProviderError;

/// Errors surfaced to the user by a command.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration
    Config(String),
    /// Bad command-line input
    Input(String),
    /// Could not read the replay file
    Replay(String),
    /// Route provider or HTTP client setup failed
    Provider(ProviderError),
    /// History could not be read or cleared
    History(HistoryError),
    /// Navigation handoff failed
    Handoff(HandoffError),
    /// Logging could not be initialized
    Logging(LoggingError),
    /// Async runtime could not start
    Runtime(String),
}

impl CliError {
    /// Print the error and exit with a non-zero status.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        if let Some(hint) = self.hint() {
            eprintln!();
            eprintln!("{}", hint);
        }
        process::exit(1);
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Run 'roadpilot config list' to review settings."),
            CliError::Handoff(HandoffError::NavigatorUnavailable(_)) => Some(
                "Set navigator.command with 'roadpilot config set navigator.command <program>'.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Replay(msg) => write!(f, "Replay failed: {}", msg),
            CliError::Provider(e) => write!(f, "Provider error: {}", e),
            CliError::History(e) => write!(f, "{}", e),
            CliError::Handoff(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Logging setup failed: {}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<HistoryError> for CliError {
    fn from(e: HistoryError) -> Self {
        CliError::History(e)
    }
}

impl From<HandoffError> for CliError {
    fn from(e: HandoffError) -> Self {
        CliError::Handoff(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
