//! Configuration
//!
//! `~/.roadpilot/config.ini` and the component configs derived from it.
//!
//! ```ini
//! [speed_limit]
//! endpoint = https://overpass-api.de
//! debounce_ms = 2000
//! ordering = last-completed
//!
//! [routes]
//! api_key = ...
//! locale = tr
//! ```

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, expand_tilde, ClassifierKind, ConfigError, ConfigFile,
    HazardSettings, HistorySettings, LoggingSettings, NavigatorSettings, RoutesSettings,
    SpeedLimitSettings,
};
pub use keys::ConfigKey;
