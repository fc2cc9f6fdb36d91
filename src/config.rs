use std::path::{Path, PathBuf};

use compact_str::CompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::result::{Result, WatchError};

/// Settings persisted in `jobwatch.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub base_url: CompactString,
    pub session_cookie: Option<CompactString>,
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: Option<String>,
    pub log_responses: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            session_cookie: None,
            interval_ms: 10_000,
            request_timeout_ms: 30_000,
            log_level: None,
            log_responses: false,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("jobwatch.toml")
    } else {
        PathBuf::from("jobwatch.toml")
    }
}

/// Loads the config file, creating it with defaults when it does not exist
pub fn load_config(config_file: &Path) -> Result<WatchConfig> {
    confy::load_path(config_file)
        .map_err(|e| WatchError::config_load_error(config_file.to_path_buf(), e))
}

pub fn save_config(config_file: &Path, config: &WatchConfig) -> Result<()> {
    confy::store_path(config_file, config)
        .map_err(|e| WatchError::config_save_error(config_file.to_path_buf(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("jobwatch-test-{}-{name}", std::process::id()))
            .join("jobwatch.toml")
    }

    #[test]
    fn saves_and_loads_round_trip() {
        let path = scratch_path("round-trip");
        let config = WatchConfig {
            session_cookie: Some("connect.sid=abc".into()),
            interval_ms: 15_000,
            ..WatchConfig::default()
        };

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = scratch_path("missing");

        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, WatchConfig::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
