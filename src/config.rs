//! Dashboard configuration
//!
//! Loaded from YAML or JSON; every field has a default so partial files
//! are accepted.

use crate::network::NetworkConfig;
use crate::record::BucketConfig;
use crate::stats::{DisplayPolicy, ManagerRoster, TallySort};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("Invalid node size range: min {min}, max {max}")]
    InvalidNodeSize { min: f64, max: f64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything the host can tune about a dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub buckets: BucketConfig,
    pub network: NetworkConfig,
    /// Initial display policy
    pub policy: DisplayPolicy,
    /// Real names or pseudonyms of managers
    pub managers: Vec<String>,
    /// Rows shown by the author ranking
    pub ranking_limit: usize,
    pub ranking_sort: TallySort,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            buckets: BucketConfig::default(),
            network: NetworkConfig::default(),
            policy: DisplayPolicy::default(),
            managers: Vec::new(),
            ranking_limit: 10,
            ranking_sort: TallySort::Total,
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: DashboardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_yaml_str(&contents)?
        };
        info!("Loaded dashboard configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.buckets.offset().is_none() {
            return Err(ConfigError::InvalidOffset(self.buckets.utc_offset_minutes));
        }
        let (min, max) = (self.network.min_node_size, self.network.max_node_size);
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InvalidNodeSize { min, max });
        }
        Ok(())
    }

    pub fn roster(&self) -> ManagerRoster {
        ManagerRoster::new(self.managers.iter().cloned())
    }
}
