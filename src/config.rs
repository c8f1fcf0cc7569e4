use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::health::DEFAULT_PROBE_INTERVAL;

pub const CONFIG_FILE: &str = ".codesense.toml";
const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_STORE_PATH: &str = ".codesense/state.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .codesense.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the review service. Falls back to CODESENSE_API_URL.
    pub url: Option<String>,
    /// Seconds between health probes
    pub probe_interval_secs: Option<u64>,
    /// Upper bound for a review request. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Where the last review is kept. Falls back to CODESENSE_STORE.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// File extensions accepted as code input
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["py", "js", "java", "c", "cpp", "txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration from .codesense.toml in the current directory.
    /// Returns default config if the file doesn't exist. Environment
    /// variables fill in whatever the file leaves unset.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.backend.url.is_none() {
            config.backend.url = std::env::var("CODESENSE_API_URL").ok();
        }
        if config.store.path.is_none() {
            config.store.path = std::env::var_os("CODESENSE_STORE").map(PathBuf::from);
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.backend.url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn probe_interval(&self) -> Duration {
        self.backend
            .probe_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_INTERVAL)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url(), "http://localhost:5000");
        assert_eq!(config.probe_interval(), Duration::from_secs(5));
        assert!(config.request_timeout().is_none());
        assert_eq!(config.store_path(), PathBuf::from(".codesense/state.json"));
        assert!(config.input.extensions.contains(&"cpp".to_string()));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[backend]
url = "https://review.example.com"
probe_interval_secs = 10
request_timeout_secs = 30

[store]
path = "/tmp/codesense.json"

[input]
extensions = ["rs", "go"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url(), "https://review.example.com");
        assert_eq!(config.probe_interval(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/codesense.json"));
        assert_eq!(config.input.extensions, ["rs", "go"]);
    }

    #[test]
    fn test_zero_probe_interval_falls_back() {
        let config: Config = toml::from_str("[backend]\nprobe_interval_secs = 0\n").unwrap();
        assert_eq!(config.probe_interval(), DEFAULT_PROBE_INTERVAL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[input]\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.input.extensions.len(), 6);
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
