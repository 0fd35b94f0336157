use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wt_schedule::ScheduleConfig;
use wt_store::{CachedStore, Geocoder, JsonFileStore, NoopGeocoder, TableGeocoder};

pub const DEFAULT_CONFIG_FILE: &str = "watertruck.toml";

/// Dispatch configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// History document location.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// JSON address table for the table geocoder; geocoding is off when unset.
    #[serde(default)]
    pub geocode_table: Option<PathBuf>,

    /// Reference date; the current local date when unset.
    #[serde(default)]
    pub today: Option<NaiveDate>,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("watertruck.json")
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            geocode_table: None,
            today: None,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl DispatchConfig {
    pub fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Load from `path`, or from `watertruck.toml` in the working directory
    /// if present. An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => bail!("config file not found: {}", p.display()),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if !config_path.exists() {
            debug!(?config_path, "config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!(?config_path, "loading config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
        Ok(config)
    }

    pub fn open_store(&self) -> Result<CachedStore<JsonFileStore>> {
        let store = JsonFileStore::open(&self.store_path)
            .with_context(|| format!("failed to open history store: {}", self.store_path.display()))?;
        Ok(CachedStore::new(store))
    }

    pub fn geocoder(&self) -> Result<Box<dyn Geocoder>> {
        match &self.geocode_table {
            Some(path) => {
                let table = TableGeocoder::from_json_file(path)
                    .with_context(|| format!("failed to load geocode table: {}", path.display()))?;
                debug!(entries = table.len(), "geocode table loaded");
                Ok(Box::new(table))
            }
            None => Ok(Box::new(NoopGeocoder)),
        }
    }
}
