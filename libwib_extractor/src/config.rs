use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_GEOMETRY, DEFAULT_MAX_TRIGGER_RECORDS, DEFAULT_PROGRESS_INTERVAL};
use super::error::ConfigError;

/// Structure representing the extraction configuration. Contains the raw file, which trigger
/// record to extract, and how to map channels.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub raw_file: PathBuf,
    pub trigger_number: u64,
    #[serde(default = "default_max_trigger_records")]
    pub max_trigger_records: usize,
    #[serde(default = "default_geometry")]
    pub geometry: String,
    #[serde(default)]
    pub channel_map_path: Option<PathBuf>,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

fn default_max_trigger_records() -> usize {
    DEFAULT_MAX_TRIGGER_RECORDS
}

fn default_geometry() -> String {
    String::from(DEFAULT_GEOMETRY)
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

impl Default for Config {
    /// Generate a new Config object. The raw file path will be invalid
    fn default() -> Self {
        Self {
            raw_file: PathBuf::from("None"),
            trigger_number: 0,
            max_trigger_records: default_max_trigger_records(),
            geometry: default_geometry(),
            channel_map_path: None,
            progress_interval: default_progress_interval(),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        std::fs::write(config_path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}
