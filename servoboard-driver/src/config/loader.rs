//! Configuration loading

use std::fs;
use std::path::Path;

use super::DriverConfig;
use crate::error::Result;

impl DriverConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DriverConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}
