//! User preferences store.
//!
//! Manages user settings and their JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use ymobar_fetch::{DEFAULT_PORTAL_DOMAIN, PortalEndpoints, SessionOptions};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

/// Lower bound for the refresh interval.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

/// Lower bound for the connect and read timeouts.
pub const MIN_TIMEOUT_SECS: u64 = 1;

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Portal domain the endpoints are built from.
    pub portal_domain: String,

    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,

    /// Read timeout per request, in seconds.
    pub read_timeout_secs: u64,

    /// Interval between refreshes in watch mode, in seconds.
    pub refresh_interval_secs: u64,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portal_domain: DEFAULT_PORTAL_DOMAIN.to_string(),
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            refresh_interval_secs: 300,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Setting keys accepted by [`Settings::set_value`].
    pub const KEYS: &'static [&'static str] = &[
        "portal_domain",
        "connect_timeout_secs",
        "read_timeout_secs",
        "refresh_interval_secs",
        "log_level",
    ];

    /// Refresh interval, never below [`MIN_REFRESH_INTERVAL_SECS`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    /// Request options for a portal session. Timeouts never go below
    /// [`MIN_TIMEOUT_SECS`], whatever the settings file says.
    pub fn session_options(&self) -> SessionOptions {
        let timeout = |secs: u64| Duration::from_secs(secs.max(MIN_TIMEOUT_SECS));
        SessionOptions::default()
            .with_connect_timeout(timeout(self.connect_timeout_secs))
            .with_read_timeout(timeout(self.read_timeout_secs))
    }

    /// Portal endpoints for the configured domain.
    pub fn endpoints(&self) -> PortalEndpoints {
        PortalEndpoints::for_domain(&self.portal_domain)
    }

    /// Sets one setting from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] for an unknown key or a value that does
    /// not parse for that key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.trim();
        match key {
            "portal_domain" => {
                if value.is_empty() || value.contains('/') {
                    return Err(StoreError::Config(format!("invalid domain: {value:?}")));
                }
                self.portal_domain = value.to_string();
            }
            "connect_timeout_secs" => {
                self.connect_timeout_secs = parse_secs(key, value, MIN_TIMEOUT_SECS)?;
            }
            "read_timeout_secs" => {
                self.read_timeout_secs = parse_secs(key, value, MIN_TIMEOUT_SECS)?;
            }
            "refresh_interval_secs" => {
                self.refresh_interval_secs = parse_secs(key, value, MIN_REFRESH_INTERVAL_SECS)?;
            }
            "log_level" => self.log_level = value.parse()?,
            _ => {
                return Err(StoreError::Config(format!(
                    "unknown setting {key:?} (expected one of: {})",
                    Self::KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str, min: u64) -> Result<u64, StoreError> {
    let secs: u64 = value
        .parse()
        .map_err(|_| StoreError::Config(format!("{key} must be a whole number of seconds")))?;
    if secs < min {
        return Err(StoreError::Config(format!("{key} must be at least {min}")));
    }
    Ok(secs)
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Config(format!("unknown log level: {other:?}"))),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings backed by a JSON file.
pub struct SettingsStore {
    settings: RwLock<Settings>,
    path: PathBuf,
}

impl SettingsStore {
    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults; a corrupt one is logged and replaced
    /// by defaults in memory.
    pub async fn load(path: PathBuf) -> Self {
        debug!(path = %path.display(), "Loading settings");
        let settings = load_json_or_default(&path).await;
        Self {
            settings: RwLock::new(settings),
            path,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Sets one setting by key.
    ///
    /// Nothing changes when the value is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] as [`Settings::set_value`] does.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut settings = self.settings.write().await;
        let mut updated = settings.clone();
        updated.set_value(key, value)?;
        *settings = updated;
        debug!(key, "Setting changed");
        Ok(())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
