//! Settings file management

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::errors::ConsoleError;
use crate::logs::LogLevel;

/// Console settings
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Write logs to files under the storage layout
    #[serde(default)]
    pub log_to_file: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Organization the filters are resolved for
    #[serde(default)]
    pub organization_id: Option<String>,

    /// API token sent with every backend request
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_token: Option<SecretString>,

    /// Size of the event window used when fetching filter targets
    #[serde(default = "default_event_window_days")]
    pub event_window_days: u32,
}

/// Longest event window accepted, in days
pub const MAX_EVENT_WINDOW_DAYS: u32 = 3650;

fn default_event_window_days() -> u32 {
    30
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            backend: BackendSettings::default(),
            organization_id: None,
            api_token: None,
            event_window_days: default_event_window_days(),
        }
    }
}

impl Settings {
    /// Check the settings are usable before any request goes out
    pub fn validate(&self) -> Result<(), ConsoleError> {
        let url = Url::parse(&self.backend.base_url).map_err(|e| {
            ConsoleError::ConfigError(format!(
                "Invalid backend URL '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConsoleError::ConfigError(format!(
                "Unsupported backend URL scheme: {}",
                url.scheme()
            )));
        }

        if !(1..=MAX_EVENT_WINDOW_DAYS).contains(&self.event_window_days) {
            return Err(ConsoleError::ConfigError(format!(
                "event_window_days must be between 1 and {}, got {}",
                MAX_EVENT_WINDOW_DAYS, self.event_window_days
            )));
        }

        Ok(())
    }
}

/// Backend API settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the backend API
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

fn default_backend_url() -> String {
    "https://api.qovery.com".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}
