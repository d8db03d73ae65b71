use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog::NormalizeOptions;
use serde::{Deserialize, Serialize};

pub const ENV_LOAD_TIMEOUT_MS: &str = "MODELTREE_LOAD_TIMEOUT_MS";
pub const ENV_CASCADE_EXPAND: &str = "MODELTREE_CASCADE_EXPAND";
pub const ENV_DEPTH_OFFSET: &str = "MODELTREE_DEPTH_OFFSET";
pub const ENV_MAX_DEPTH: &str = "MODELTREE_MAX_DEPTH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Viewer settings, fixed at mount time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub load_timeout_ms: u64,
    /// Expanding a node shows its direct children; collapsing hides them.
    pub cascade_expand_visibility: bool,
    pub category_depth_offset: i64,
    pub max_category_depth: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            cascade_expand_visibility: true,
            category_depth_offset: catalog::DEFAULT_DEPTH_OFFSET,
            max_category_depth: catalog::DEFAULT_MAX_DEPTH,
        }
    }
}

impl ViewerConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            depth_offset: self.category_depth_offset,
            max_depth: self.max_category_depth,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    /// Defaults overridden by `MODELTREE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (an environment-like key/value source).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_LOAD_TIMEOUT_MS) {
            self.load_timeout_ms = parse_env(ENV_LOAD_TIMEOUT_MS, v)?;
        }
        if let Some(v) = lookup(ENV_CASCADE_EXPAND) {
            self.cascade_expand_visibility = match v.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_CASCADE_EXPAND,
                        value: v,
                    });
                }
            };
        }
        if let Some(v) = lookup(ENV_DEPTH_OFFSET) {
            self.category_depth_offset = parse_env(ENV_DEPTH_OFFSET, v)?;
        }
        if let Some(v) = lookup(ENV_MAX_DEPTH) {
            self.max_category_depth = parse_env(ENV_MAX_DEPTH, v)?;
        }
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
