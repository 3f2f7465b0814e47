//! Alias configuration.
//!
//! A JSON file with optional `status`, `priority` and `type` maps. Each maps a
//! legacy display string to a canonical value:
//!
//! ```json
//! { "status": { "🚧 Under Review": "in_progress" }, "type": { "enhancement": "feature" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasConfig {
    #[serde(default)]
    pub status: BTreeMap<String, String>,
    #[serde(default)]
    pub priority: BTreeMap<String, String>,
    #[serde(default, rename = "type")]
    pub task_type: BTreeMap<String, String>,
}

impl AliasConfig {
    /// Load an alias config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let buf = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: AliasConfig =
            serde_json::from_str(&buf).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        debug!(
            "loaded {} alias(es) from {}",
            config.status.len() + config.priority.len() + config.task_type.len(),
            path.display()
        );
        Ok(config)
    }
}
