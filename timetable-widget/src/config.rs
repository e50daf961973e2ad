use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;
use timetable_client::BackendUrl;
use tracing::{debug, warn};

pub const MAX_GROUP: u32 = 10;
/// One day, in seconds.
pub const MAX_UPDATE_INTERVAL: u64 = 86_400;

/// User-adjustable widget settings, persisted as pretty JSON.
///
/// Any key missing from the file takes its default; see [`ConfigStore::load`]
/// for what happens with unreadable files and out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Base URL of the timetable backend, e.g. "http://localhost:5000"
    pub backend_url: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Subgroup filter; 0 shows every lesson.
    pub group: u32,
    /// Window opacity, 0.0 to 1.0.
    pub transparency: f64,
    /// Seconds between timetable refreshes.
    pub update_interval: u64,
    pub auto_start: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            x: 100,
            y: 100,
            width: 400,
            height: 500,
            group: 0,
            transparency: 0.95,
            update_interval: 300,
            auto_start: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ConfigKey {
    BackendUrl,
    X,
    Y,
    Width,
    Height,
    Group,
    Transparency,
    UpdateInterval,
    AutoStart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(s) => f.write_str(s),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`{key}` expects {expected}, got `{value}`")]
    WrongType {
        key: ConfigKey,
        expected: &'static str,
        value: String,
    },
    #[error("`{key}` must be {range}, got {value}")]
    OutOfRange {
        key: ConfigKey,
        range: &'static str,
        value: String,
    },
}

impl ConfigKey {
    fn expected(self) -> &'static str {
        match self {
            ConfigKey::BackendUrl => "a string",
            ConfigKey::Transparency => "a number",
            ConfigKey::AutoStart => "true or false",
            _ => "an integer",
        }
    }

    fn wrong_type(self, value: impl ToString) -> ConfigError {
        ConfigError::WrongType {
            key: self,
            expected: self.expected(),
            value: value.to_string(),
        }
    }

    fn out_of_range(self, range: &'static str, value: impl ToString) -> ConfigError {
        ConfigError::OutOfRange {
            key: self,
            range,
            value: value.to_string(),
        }
    }

    /// Parse command-line text into a value of the type this key holds.
    pub fn parse_value(self, raw: &str) -> Result<ConfigValue, ConfigError> {
        let raw = raw.trim();
        match self {
            ConfigKey::BackendUrl => Ok(ConfigValue::Text(raw.to_string())),
            ConfigKey::Transparency => raw
                .parse::<f64>()
                .map(ConfigValue::Float)
                .map_err(|_| self.wrong_type(raw)),
            ConfigKey::AutoStart => raw
                .parse::<bool>()
                .map(ConfigValue::Bool)
                .map_err(|_| self.wrong_type(raw)),
            _ => raw
                .parse::<i64>()
                .map(ConfigValue::Int)
                .map_err(|_| self.wrong_type(raw)),
        }
    }
}

fn int_in<T: TryFrom<i64>>(
    key: ConfigKey,
    value: &ConfigValue,
    range: &'static str,
    accept: impl Fn(i64) -> bool,
) -> Result<T, ConfigError> {
    let ConfigValue::Int(v) = value else {
        return Err(key.wrong_type(value));
    };
    if !accept(*v) {
        return Err(key.out_of_range(range, v));
    }
    T::try_from(*v).map_err(|_| key.out_of_range(range, v))
}

impl WidgetConfig {
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::BackendUrl => ConfigValue::Text(self.backend_url.clone()),
            ConfigKey::X => ConfigValue::Int(self.x.into()),
            ConfigKey::Y => ConfigValue::Int(self.y.into()),
            ConfigKey::Width => ConfigValue::Int(self.width.into()),
            ConfigKey::Height => ConfigValue::Int(self.height.into()),
            ConfigKey::Group => ConfigValue::Int(self.group.into()),
            ConfigKey::Transparency => ConfigValue::Float(self.transparency),
            ConfigKey::UpdateInterval => {
                ConfigValue::Int(i64::try_from(self.update_interval).unwrap_or(i64::MAX))
            }
            ConfigKey::AutoStart => ConfigValue::Bool(self.auto_start),
        }
    }

    /// Validate and assign. On error nothing changes.
    pub fn apply(&mut self, key: ConfigKey, value: &ConfigValue) -> Result<(), ConfigError> {
        match key {
            ConfigKey::BackendUrl => {
                let ConfigValue::Text(url) = value else {
                    return Err(key.wrong_type(value));
                };
                let url = url.trim();
                if BackendUrl::parse(url).is_err() {
                    return Err(key.out_of_range("an http(s) URL", format!("\"{}\"", url)));
                }
                self.backend_url = url.to_string();
            }
            ConfigKey::X => self.x = int_in(key, value, "a 32-bit integer", |_| true)?,
            ConfigKey::Y => self.y = int_in(key, value, "a 32-bit integer", |_| true)?,
            ConfigKey::Width => self.width = int_in(key, value, "greater than 0", |v| v > 0)?,
            ConfigKey::Height => self.height = int_in(key, value, "greater than 0", |v| v > 0)?,
            ConfigKey::Group => {
                self.group = int_in(key, value, "between 0 and 10", |v| {
                    (0..=i64::from(MAX_GROUP)).contains(&v)
                })?
            }
            ConfigKey::Transparency => {
                let v = match value {
                    ConfigValue::Float(v) => *v,
                    ConfigValue::Int(v) => *v as f64,
                    _ => return Err(key.wrong_type(value)),
                };
                if !(0.0..=1.0).contains(&v) {
                    return Err(key.out_of_range("between 0.0 and 1.0", v));
                }
                self.transparency = v;
            }
            ConfigKey::UpdateInterval => {
                self.update_interval = int_in(key, value, "between 1 and 86400 seconds", |v| {
                    (1..=MAX_UPDATE_INTERVAL as i64).contains(&v)
                })?
            }
            ConfigKey::AutoStart => {
                let ConfigValue::Bool(b) = value else {
                    return Err(key.wrong_type(value));
                };
                self.auto_start = *b;
            }
        }
        Ok(())
    }

    /// Replace every out-of-range value with its default.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for key in ConfigKey::iter() {
            let mut candidate = self.clone();
            if let Err(e) = candidate.apply(key, &self.get(key)) {
                warn!("Ignoring stored value: {}; using default", e);
                // Defaults always validate.
                let _ = self.apply(key, &defaults.get(key));
            }
        }
        self
    }
}

/// Owns the config record and the file it lives in. Every successful
/// mutation is written to disk before returning.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: WidgetConfig,
}

fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("timetable-widget"))
}

impl ConfigStore {
    pub fn default_path() -> Result<PathBuf> {
        Ok(root_path()?.join("config.json"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(root_path()?.join("widget.log"))
    }

    /// Load config from disk. Never fails: a missing, unreadable or corrupt
    /// file yields the full default record.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match Self::read(&path) {
            Ok(Some(config)) => config.sanitized(),
            Ok(None) => {
                debug!("No config at {}, using defaults", path.display());
                WidgetConfig::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}; using defaults", e);
                WidgetConfig::default()
            }
        };
        Self { path, config }
    }

    fn read(path: &Path) -> Result<Option<WidgetConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(Some(config))
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write config at {}", self.path.display()))?;
        Ok(())
    }

    /// Persist the whole record. I/O failures are logged, not returned.
    pub fn save(&self) {
        if let Err(e) = self.write() {
            warn!("Failed to save config: {:#}", e);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        self.config.get(key)
    }

    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<(), ConfigError> {
        self.config.apply(key, &value)?;
        debug!("config {} = {}", key, value);
        self.save();
        Ok(())
    }

    pub fn backend_url(&self) -> &str {
        &self.config.backend_url
    }

    pub fn group(&self) -> u32 {
        self.config.group
    }

    pub fn transparency(&self) -> f64 {
        self.config.transparency
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.config.update_interval)
    }

    /// Both coordinates are written together or not at all.
    pub fn set_position(&mut self, x: i32, y: i32) -> Result<(), ConfigError> {
        self.set_pair((ConfigKey::X, x.into()), (ConfigKey::Y, y.into()))
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        self.set_pair(
            (ConfigKey::Width, width.into()),
            (ConfigKey::Height, height.into()),
        )
    }

    fn set_pair(&mut self, a: (ConfigKey, i64), b: (ConfigKey, i64)) -> Result<(), ConfigError> {
        let mut candidate = self.config.clone();
        candidate.apply(a.0, &ConfigValue::Int(a.1))?;
        candidate.apply(b.0, &ConfigValue::Int(b.1))?;
        self.config = candidate;
        debug!("config {} = {}, {} = {}", a.0, a.1, b.0, b.1);
        self.save();
        Ok(())
    }
}
