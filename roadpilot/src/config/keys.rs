//! Addressable configuration keys.
//!
//! Each key maps a `section.key` name to a field of [`ConfigFile`], with
//! string conversion in both directions. Used by the INI reader/writer and
//! by `roadpilot config get|set|list`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::speed_limit::LimitOrdering;

use super::file::{expand_tilde, ClassifierKind, ConfigError, ConfigFile};

/// Every configurable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SpeedLimitEndpoint,
    SpeedLimitRadiusMeters,
    SpeedLimitDebounceMs,
    SpeedLimitDefaultLimitKph,
    SpeedLimitTimeoutSecs,
    SpeedLimitOrdering,

    RoutesEndpoint,
    RoutesApiKey,
    RoutesTimeoutSecs,
    RoutesLocale,

    HazardsClassifier,
    HazardsZonesFile,

    HistoryFile,
    HistoryCapacity,

    NavigatorCommand,
    NavigatorUriTemplate,

    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::SpeedLimitEndpoint,
    ConfigKey::SpeedLimitRadiusMeters,
    ConfigKey::SpeedLimitDebounceMs,
    ConfigKey::SpeedLimitDefaultLimitKph,
    ConfigKey::SpeedLimitTimeoutSecs,
    ConfigKey::SpeedLimitOrdering,
    ConfigKey::RoutesEndpoint,
    ConfigKey::RoutesApiKey,
    ConfigKey::RoutesTimeoutSecs,
    ConfigKey::RoutesLocale,
    ConfigKey::HazardsClassifier,
    ConfigKey::HazardsZonesFile,
    ConfigKey::HistoryFile,
    ConfigKey::HistoryCapacity,
    ConfigKey::NavigatorCommand,
    ConfigKey::NavigatorUriTemplate,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        ALL_KEYS
    }

    /// Full name, e.g. `routes.api_key`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::SpeedLimitEndpoint => "speed_limit.endpoint",
            ConfigKey::SpeedLimitRadiusMeters => "speed_limit.radius_meters",
            ConfigKey::SpeedLimitDebounceMs => "speed_limit.debounce_ms",
            ConfigKey::SpeedLimitDefaultLimitKph => "speed_limit.default_limit_kph",
            ConfigKey::SpeedLimitTimeoutSecs => "speed_limit.timeout_secs",
            ConfigKey::SpeedLimitOrdering => "speed_limit.ordering",
            ConfigKey::RoutesEndpoint => "routes.endpoint",
            ConfigKey::RoutesApiKey => "routes.api_key",
            ConfigKey::RoutesTimeoutSecs => "routes.timeout_secs",
            ConfigKey::RoutesLocale => "routes.locale",
            ConfigKey::HazardsClassifier => "hazards.classifier",
            ConfigKey::HazardsZonesFile => "hazards.zones_file",
            ConfigKey::HistoryFile => "history.file",
            ConfigKey::HistoryCapacity => "history.capacity",
            ConfigKey::NavigatorCommand => "navigator.command",
            ConfigKey::NavigatorUriTemplate => "navigator.uri_template",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SpeedLimitEndpoint => config.speed_limit.endpoint.clone(),
            ConfigKey::SpeedLimitRadiusMeters => config.speed_limit.radius_meters.to_string(),
            ConfigKey::SpeedLimitDebounceMs => config.speed_limit.debounce_ms.to_string(),
            ConfigKey::SpeedLimitDefaultLimitKph => config.speed_limit.default_limit_kph.to_string(),
            ConfigKey::SpeedLimitTimeoutSecs => config.speed_limit.timeout_secs.to_string(),
            ConfigKey::SpeedLimitOrdering => config.speed_limit.ordering.to_string(),
            ConfigKey::RoutesEndpoint => config.routes.endpoint.clone(),
            ConfigKey::RoutesApiKey => config.routes.api_key.clone().unwrap_or_default(),
            ConfigKey::RoutesTimeoutSecs => config.routes.timeout_secs.to_string(),
            ConfigKey::RoutesLocale => config.routes.locale.clone(),
            ConfigKey::HazardsClassifier => config.hazards.classifier.as_str().to_string(),
            ConfigKey::HazardsZonesFile => config
                .hazards
                .zones_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::HistoryFile => config.history.file.display().to_string(),
            ConfigKey::HistoryCapacity => config.history.capacity.to_string(),
            ConfigKey::NavigatorCommand => config.navigator.command.clone(),
            ConfigKey::NavigatorUriTemplate => config.navigator.uri_template.clone(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Validates `value` and stores it. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::SpeedLimitEndpoint => config.speed_limit.endpoint = self.url(value)?,
            ConfigKey::SpeedLimitRadiusMeters => {
                config.speed_limit.radius_meters = self.positive(value)?
            }
            ConfigKey::SpeedLimitDebounceMs => {
                config.speed_limit.debounce_ms = self.number::<i64>(value)?.max(0)
            }
            ConfigKey::SpeedLimitDefaultLimitKph => {
                config.speed_limit.default_limit_kph = self.positive(value)?
            }
            ConfigKey::SpeedLimitTimeoutSecs => {
                config.speed_limit.timeout_secs = u64::from(self.positive::<u32>(value)?)
            }
            ConfigKey::SpeedLimitOrdering => {
                config.speed_limit.ordering = value
                    .parse::<LimitOrdering>()
                    .map_err(|reason| self.invalid(value, reason))?
            }
            ConfigKey::RoutesEndpoint => config.routes.endpoint = self.url(value)?,
            ConfigKey::RoutesApiKey => {
                config.routes.api_key = (!value.is_empty()).then(|| value.to_string())
            }
            ConfigKey::RoutesTimeoutSecs => {
                config.routes.timeout_secs = u64::from(self.positive::<u32>(value)?)
            }
            ConfigKey::RoutesLocale => match value.to_lowercase().as_str() {
                "tr" | "en" => config.routes.locale = value.to_lowercase(),
                _ => return Err(self.invalid(value, "expected tr or en")),
            },
            ConfigKey::HazardsClassifier => {
                config.hazards.classifier = ClassifierKind::parse(value)
                    .ok_or_else(|| self.invalid(value, "expected reference, geofence or none"))?
            }
            ConfigKey::HazardsZonesFile => {
                config.hazards.zones_file = (!value.is_empty()).then(|| expand_tilde(value))
            }
            ConfigKey::HistoryFile => config.history.file = self.path(value)?,
            ConfigKey::HistoryCapacity => config.history.capacity = self.positive(value)?,
            ConfigKey::NavigatorCommand => config.navigator.command = value.to_string(),
            ConfigKey::NavigatorUriTemplate => {
                if !value.contains("{lat}") || !value.contains("{lng}") {
                    return Err(self.invalid(value, "template must contain {lat} and {lng}"));
                }
                config.navigator.uri_template = value.to_string()
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level
            }
            ConfigKey::LoggingDirectory => config.logging.directory = self.path(value)?,
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn number<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value
            .parse()
            .map_err(|_| self.invalid(value, "expected a number"))
    }

    fn positive<T: FromStr + Default + PartialOrd>(&self, value: &str) -> Result<T, ConfigError> {
        let n: T = self.number(value)?;
        if n <= T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(n)
    }

    fn url(&self, value: &str) -> Result<String, ConfigError> {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(self.invalid(value, "expected an http(s) URL"));
        }
        Ok(value.trim_end_matches('/').to_string())
    }

    fn path(&self, value: &str) -> Result<PathBuf, ConfigError> {
        if value.is_empty() {
            return Err(self.invalid(value, "path cannot be empty"));
        }
        Ok(expand_tilde(value))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
