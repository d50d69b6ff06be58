//! Persistent defaults.
//!
//! The rest of the crate only talks to [`SettingsStore`]. On disk the values
//! live in a small TOML file in the platform config directory:
//!
//! ```toml
//! defaultBaudRate = 115200
//! defaultPortName = "/dev/ttyUSB0"
//! ```
//!
//! The file is created on the first write and rewritten on every write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;

const APP_DIR: &str = "nodemcutil";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SettingKey {
    DefaultPortName,
    DefaultBaudRate,
}

impl SettingKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            SettingKey::DefaultPortName => "defaultPortName",
            SettingKey::DefaultBaudRate => "defaultBaudRate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Text(String),
}

impl SettingValue {
    pub fn to_text(&self) -> String {
        match self {
            SettingValue::Integer(value) => value.to_string(),
            SettingValue::Text(value) => value.clone(),
        }
    }

    /// Integers stored as text are accepted as long as they parse.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(value) => Some(*value),
            SettingValue::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Integer(i64::from(value))
    }
}

pub trait SettingsStore {
    fn contains(&self, key: SettingKey) -> bool {
        self.value(key).is_some()
    }

    fn value(&self, key: SettingKey) -> Option<SettingValue>;

    /// Stores `value` under `key`. Durable stores persist before returning.
    fn set_value(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: BTreeMap<SettingKey, SettingValue>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn value(&self, key: SettingKey) -> Option<SettingValue> {
        self.values.get(&key).cloned()
    }

    fn set_value(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        self.values.insert(key, value);
        Ok(())
    }
}

/// Store backed by a TOML file.
#[derive(Debug)]
pub struct TomlSettings {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
}

impl TomlSettings {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();

        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        Ok(TomlSettings { path, values })
    }

    /// Opens the store in the platform config directory.
    pub fn open_default() -> Result<Self, SettingsError> {
        Self::open(settings_file_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for TomlSettings {
    fn value(&self, key: SettingKey) -> Option<SettingValue> {
        self.values.get(key.as_str()).cloned()
    }

    fn set_value(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        self.values.insert(key.as_str().to_owned(), value);
        self.save()
    }
}

pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    platform_config_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .ok_or(SettingsError::NoPlatformConfigDir)
}

fn platform_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join(APP_DIR))
}
