//! scout.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PLUGIN_LOAD_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub searcher: SearcherConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearcherConfig {
    /// Directory holding `searcher-plugin.toml`. Unset means the built-in searcher.
    pub plugin_dir: Option<PathBuf>,
    #[serde(default = "default_plugin_load_timeout_secs")]
    pub plugin_load_timeout_secs: u64,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            plugin_load_timeout_secs: DEFAULT_PLUGIN_LOAD_TIMEOUT_SECS,
        }
    }
}

impl SearcherConfig {
    pub fn plugin_load_timeout(&self) -> Duration {
        Duration::from_secs(self.plugin_load_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_plugin_load_timeout_secs() -> u64 {
    DEFAULT_PLUGIN_LOAD_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ScoutConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScoutConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
