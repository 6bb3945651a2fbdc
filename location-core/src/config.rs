use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    api::{Country, Endpoints},
    error::{Error, Result},
};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "LS_API_KEY";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// country = "row"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// `row` (rest of world) or `china`.
    pub country: Option<String>,

    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
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

        Ok(path)
    }

    pub fn config_file_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "location-services", "location-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Immutable settings a client is built from.
///
/// Resolved once; a missing API key fails here rather than on the first call.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    country: Country,
    timeout_secs: u64,
    endpoints: Endpoints,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        Ok(Self {
            api_key,
            country: Country::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::for_country(Country::default()),
        })
    }

    /// Resolve from the process environment only.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, |k| std::env::var(k).ok(), &Config::default())
    }

    /// Precedence: explicit key, then `LS_API_KEY` (via `env`), then the config file.
    pub fn resolve<F>(explicit: Option<String>, env: F, file: &Config) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|k| !k.trim().is_empty()))
            .or_else(|| file.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "No API key found. Pass one explicitly, set {API_KEY_ENV}, \
                     or run `ls configure`."
                ))
            })?;

        let country = match &file.country {
            Some(c) => Country::try_from(c.as_str()).map_err(|e| Error::Config(e.to_string()))?,
            None => Country::default(),
        };

        let timeout_secs = check_timeout(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))?;

        Ok(Self {
            api_key,
            country,
            timeout_secs,
            endpoints: Endpoints::for_country(country),
        })
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.country = country;
        self.endpoints = Endpoints::for_country(country);
        self
    }

    /// Override the service URLs, e.g. to point at a mock server.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Result<Self> {
        self.timeout_secs = check_timeout(timeout_secs)?;
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

fn check_timeout(timeout_secs: u64) -> Result<u64> {
    if timeout_secs == 0 {
        return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
    }
    Ok(timeout_secs)
}
