use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};

use crate::model::Coordinates;

/// Default lifetime of the error banner.
pub const DEFAULT_BANNER_DELAY_MS: u64 = 2700;

/// External services that need credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    OpenWeather,
    Here,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::Here => "here",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::Here]
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "here" => Ok(ServiceId::Here),
            _ => Err(anyhow!(
                "Unknown service '{value}'. Supported services: openweather, here."
            )),
        }
    }
}

/// OpenWeatherMap credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    pub api_key: String,
}

/// HERE geocoder autocomplete credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HereConfig {
    pub app_id: String,
    pub app_code: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// banner_delay_ms = 2700
///
/// [openweather]
/// api_key = "..."
///
/// [here]
/// app_id = "..."
/// app_code = "..."
///
/// [device]
/// latitude = 47.37
/// longitude = 8.54
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_banner_delay")]
    pub banner_delay_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather: Option<OpenWeatherConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub here: Option<HereConfig>,

    /// Position reported by this machine when geolocation is asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Coordinates>,
}

const fn default_banner_delay() -> u64 {
    DEFAULT_BANNER_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            banner_delay_ms: default_banner_delay(),
            openweather: None,
            here: None,
            device: None,
        }
    }
}

impl Config {
    /// Load config from disk (empty default if missing), then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load only what is on disk, without environment overrides.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Credentials from `OPENWEATHER_API_KEY`, `HERE_APP_ID` and `HERE_APP_CODE`
    /// take precedence over the file. `lookup` abstracts the environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty("OPENWEATHER_API_KEY") {
            self.openweather = Some(OpenWeatherConfig { api_key });
        }

        let app_id = non_empty("HERE_APP_ID");
        let app_code = non_empty("HERE_APP_CODE");
        if let (Some(app_id), Some(app_code)) = (&app_id, &app_code) {
            self.set_here_credentials(app_id.clone(), app_code.clone());
        } else if let Some(here) = self.here.as_mut() {
            if let Some(app_id) = app_id {
                here.app_id = app_id;
            }
            if let Some(app_code) = app_code {
                here.app_code = app_code;
            }
        }
    }

    pub fn openweather_api_key(&self) -> Option<&str> {
        self.openweather.as_ref().map(|cfg| cfg.api_key.as_str())
    }

    pub fn set_openweather_api_key(&mut self, api_key: String) {
        self.openweather = Some(OpenWeatherConfig { api_key });
    }

    pub fn set_here_credentials(&mut self, app_id: String, app_code: String) {
        self.here = Some(HereConfig { app_id, app_code });
    }

    pub fn is_service_configured(&self, id: ServiceId) -> bool {
        match id {
            ServiceId::OpenWeather => self.openweather.is_some(),
            ServiceId::Here => self.here.is_some(),
        }
    }
}
