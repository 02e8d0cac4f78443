use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::codec::error::CodecError;
use crate::kernel::constants::UNLIMITED_STORAGE;
use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::selector::BackendKind;

/// Supported text formats, for configuration files and stored documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// JSON format (.json)
    #[default]
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl DataFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            DataFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            DataFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Whether documents in this format can hold a null
    pub fn has_null(&self) -> bool {
        match self {
            DataFormat::Json => true,
            #[cfg(feature = "yaml-config")]
            DataFormat::Yaml => true,
            #[cfg(feature = "toml-config")]
            DataFormat::Toml => false,
        }
    }

    /// Render a value as text in this format
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> std::result::Result<String, CodecError> {
        let format = self.extension();
        match self {
            DataFormat::Json => serde_json::to_string_pretty(value).map_err(|e| CodecError::render(format, e)),
            #[cfg(feature = "yaml-config")]
            DataFormat::Yaml => serde_yaml::to_string(value).map_err(|e| CodecError::render(format, e)),
            #[cfg(feature = "toml-config")]
            DataFormat::Toml => toml::to_string_pretty(value).map_err(|e| CodecError::render(format, e)),
        }
    }

    /// Parse text in this format
    pub fn parse<T: DeserializeOwned>(&self, data: &str) -> std::result::Result<T, CodecError> {
        let format = self.extension();
        match self {
            DataFormat::Json => serde_json::from_str(data).map_err(|e| CodecError::parse(format, e)),
            #[cfg(feature = "yaml-config")]
            DataFormat::Yaml => serde_yaml::from_str(data).map_err(|e| CodecError::parse(format, e)),
            #[cfg(feature = "toml-config")]
            DataFormat::Toml => toml::from_str(data).map_err(|e| CodecError::parse(format, e)),
        }
    }
}

impl FromStr for DataFormat {
    type Err = StorageSystemError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Ok(DataFormat::Toml),
            other => Err(StorageSystemError::InvalidConfig(format!("unsupported format '{}'", other))),
        }
    }
}

/// In-memory key/value configuration data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create a configuration from a HashMap
    pub fn from_hashmap(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            StorageSystemError::InvalidConfig(format!("Failed to serialize config value '{}': {}", key, e))
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Set a string value; strings always serialize
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), serde_json::Value::String(value.into()));
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: DataFormat) -> Result<Self> {
        format
            .parse(data)
            .map_err(|e| StorageSystemError::InvalidConfig(e.to_string()).into())
    }

    fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.values.clone().into_iter().collect())
    }
}

/// Settings of a storage object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend selection
    pub backend: BackendKind,
    /// Format of stored documents
    pub format: DataFormat,
    /// Advisory limit in bytes, -1 for unlimited
    pub storage_limit: i64,
    /// Storage directory override; resolved from the platform when unset
    pub directory: Option<PathBuf>,
    /// Register the constructor-based fix for `Rect`
    pub legacy_geometry_fix: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            format: DataFormat::Json,
            storage_limit: UNLIMITED_STORAGE,
            directory: None,
            legacy_geometry_fix: false,
        }
    }
}

impl StorageConfig {
    /// Check values serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.storage_limit < UNLIMITED_STORAGE {
            return Err(StorageSystemError::InvalidStorageLimit(self.storage_limit).into());
        }
        Ok(())
    }

    /// Build from loaded configuration data
    pub fn from_config_data(data: &ConfigData) -> Result<Self> {
        let config: StorageConfig = serde_json::from_value(data.to_value())
            .map_err(|e| StorageSystemError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; the extension selects the format
    pub fn load(path: &Path) -> Result<Self> {
        let format = DataFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::InvalidConfig(format!("Unknown config format for path: {}", path.display()))
        })?;
        let content = fs::read_to_string(path).map_err(|e| {
            StorageSystemError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let data = ConfigData::deserialize(&content, format)?;
        Self::from_config_data(&data)
    }
}
