/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: apirank.toml (in working directory)
/// 3. Environment variables: prefixed APIRANK_ (e.g., APIRANK_LOG_LEVEL=debug)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::ApiRankError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional path for the JSONL request audit log. Disabled when unset.
    #[serde(default)]
    pub audit_log: Option<String>,

    /// Path to the JSON dataset used by the file-backed retriever.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Default result count when a request does not specify top_k.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dataset_path() -> String {
    "data/api_dataset.json".to_string()
}

fn default_top_k() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            audit_log: None,
            dataset_path: default_dataset_path(),
            default_top_k: default_top_k(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: APIRANK_LOG_LEVEL=debug overrides log_level in apirank.toml
    pub fn load() -> Result<Config, ApiRankError> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("apirank.toml"))
            .merge(Env::prefixed("APIRANK_"))
            .extract()
            .map_err(|e| ApiRankError::Config(format!("Failed to load config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.audit_log, None);
        assert_eq!(config.dataset_path, "data/api_dataset.json");
        assert_eq!(config.default_top_k, 10);
    }
}
