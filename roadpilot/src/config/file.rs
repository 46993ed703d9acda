//! INI configuration file.
//!
//! Lives at `~/.roadpilot/config.ini`. Every section is optional; missing
//! keys take their defaults. Values are read and written through
//! [`ConfigKey`], so the file layout and the `config get/set` command always
//! agree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::alert::{GeofenceClassifier, HazardClassifier, NoHazards, ReferenceSpeedClassifier};
use crate::handoff::{CommandNavigator, DEFAULT_NAVIGATOR_COMMAND, DEFAULT_URI_TEMPLATE};
use crate::history::{JsonFileHistoryStore, DEFAULT_HISTORY_CAPACITY};
use crate::provider::{DEFAULT_OVERPASS_ENDPOINT, DEFAULT_ROUTES_ENDPOINT, DEFAULT_SEARCH_RADIUS_METERS};
use crate::routes::{FormatLocale, RouteEngineConfig};
use crate::speed_limit::{
    LimitOrdering, SpeedLimitConfig, DEFAULT_DEBOUNCE_MS, DEFAULT_SPEED_LIMIT_KPH,
};

use super::keys::ConfigKey;

/// Errors loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the config file, history and logs.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roadpilot")
}

/// Path of the config file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Which hazard classifier to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    #[default]
    Reference,
    Geofence,
    None,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::Reference => "reference",
            ClassifierKind::Geofence => "geofence",
            ClassifierKind::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reference" => Some(ClassifierKind::Reference),
            "geofence" => Some(ClassifierKind::Geofence),
            "none" | "off" => Some(ClassifierKind::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedLimitSettings {
    pub endpoint: String,
    pub radius_meters: u32,
    pub debounce_ms: i64,
    pub default_limit_kph: u32,
    pub timeout_secs: u64,
    pub ordering: LimitOrdering,
}

impl Default for SpeedLimitSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_limit_kph: DEFAULT_SPEED_LIMIT_KPH,
            timeout_secs: 8,
            ordering: LimitOrdering::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutesSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub locale: String,
}

impl Default for RoutesSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ROUTES_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 8,
            locale: "tr".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HazardSettings {
    pub classifier: ClassifierKind,
    pub zones_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySettings {
    pub file: PathBuf,
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            file: config_dir().join("history.json"),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorSettings {
    pub command: String,
    pub uri_template: String,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_NAVIGATOR_COMMAND.to_string(),
            uri_template: DEFAULT_URI_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: config_dir().join("logs"),
        }
    }
}

/// Parsed contents of `config.ini`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub speed_limit: SpeedLimitSettings,
    pub routes: RoutesSettings,
    pub hazards: HazardSettings,
    pub history: HistorySettings,
    pub navigator: NavigatorSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads from [`config_file_path`]. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content)
    }

    /// Parses INI text. Unknown sections and keys are ignored.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                let value = value.trim();
                if !value.is_empty() {
                    key.set(&mut config, value)?;
                }
            }
        }

        Ok(config)
    }

    /// Writes to [`config_file_path`], creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ini_string()?)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Renders every key, leaving unset optional values empty.
    pub fn to_ini_string(&self) -> Result<String, ConfigError> {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        let mut buffer = Vec::new();
        ini.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn speed_limit_config(&self) -> SpeedLimitConfig {
        SpeedLimitConfig::default()
            .with_debounce_ms(self.speed_limit.debounce_ms)
            .with_default_limit_kph(self.speed_limit.default_limit_kph)
            .with_request_timeout(Duration::from_secs(self.speed_limit.timeout_secs))
            .with_ordering(self.speed_limit.ordering)
    }

    pub fn route_engine_config(&self) -> RouteEngineConfig {
        RouteEngineConfig::default()
            .with_request_timeout(Duration::from_secs(self.routes.timeout_secs))
    }

    pub fn format_locale(&self) -> FormatLocale {
        FormatLocale::from_name(&self.routes.locale).unwrap_or_default()
    }

    /// Builds the configured hazard classifier.
    pub fn hazard_classifier(&self) -> Result<Box<dyn HazardClassifier>, ConfigError> {
        match self.hazards.classifier {
            ClassifierKind::Reference => Ok(Box::new(ReferenceSpeedClassifier)),
            ClassifierKind::None => Ok(Box::new(NoHazards)),
            ClassifierKind::Geofence => {
                let path = self.hazards.zones_file.as_ref().ok_or_else(|| {
                    ConfigError::InvalidValue {
                        key: ConfigKey::HazardsZonesFile.name().to_string(),
                        value: String::new(),
                        reason: "required when hazards.classifier = geofence".to_string(),
                    }
                })?;
                let classifier = GeofenceClassifier::from_json_file(path).map_err(|e| {
                    ConfigError::InvalidValue {
                        key: ConfigKey::HazardsZonesFile.name().to_string(),
                        value: path.display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Box::new(classifier))
            }
        }
    }

    pub fn history_store(&self) -> Arc<JsonFileHistoryStore> {
        Arc::new(JsonFileHistoryStore::with_capacity(
            &self.history.file,
            self.history.capacity,
        ))
    }

    pub fn navigator(&self) -> CommandNavigator {
        CommandNavigator::new(&self.navigator.command, &self.navigator.uri_template)
    }
}
