//! RRC SAP Configuration
//!
//! Loaded from YAML (or TOML) with serde defaults for every field.

use crate::SapError;
use interfaces::CodecConfig;
use serde::{Deserialize, Serialize};

/// Configuration of the RRC SAP layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RrcSapConfig {
    /// Maximum number of concurrently set up UE sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Handover codec limits
    #[serde(default)]
    pub codec: CodecConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_max_sessions() -> usize {
    65535 // one per C-RNTI value
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Default level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for RrcSapConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            codec: CodecConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl RrcSapConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> anyhow::Result<Self> {
        let config: RrcSapConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: RrcSapConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check limits
    pub fn validate(&self) -> Result<(), SapError> {
        if self.max_sessions == 0 {
            return Err(SapError::InvalidConfiguration(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        self.codec
            .validate()
            .map_err(|e| SapError::InvalidConfiguration(e.to_string()))
    }
}
