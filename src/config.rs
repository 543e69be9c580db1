//! Profiler configuration stored in `~/.csr-profiler/config.json`.
//!
//! Every field has a serde default, so a missing file or a partial file both
//! produce a usable config. The API key can come from the environment
//! (`GEMINI_API_KEY`, then `API_KEY`), which wins over the file.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ProfilerError;

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Key under which the whole record collection is stored.
pub const DEFAULT_STORAGE_KEY: &str = "companyDataCrawlerApp";
pub const DEFAULT_CSV_NAME_HEADER: &str = "Names of Organisation";
pub const DEFAULT_CSV_CIN_HEADER: &str = "CIN";

const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory holding the key-value store files. Defaults to `~/.csr-profiler/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_csv_name_header")]
    pub csv_name_header: String,
    #[serde(default = "default_csv_cin_header")]
    pub csv_cin_header: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_csv_name_header() -> String {
    DEFAULT_CSV_NAME_HEADER.to_string()
}

fn default_csv_cin_header() -> String {
    DEFAULT_CSV_CIN_HEADER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            storage_dir: None,
            storage_key: default_storage_key(),
            csv_name_header: default_csv_name_header(),
            csv_cin_header: default_csv_cin_header(),
        }
    }
}

impl Config {
    /// The API key to use, if any. Blank keys count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    /// Storage directory, falling back to `~/.csr-profiler/data`.
    pub fn resolved_storage_dir(&self) -> Result<PathBuf, ProfilerError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(state_dir()?.join("data")),
        }
    }

    /// Apply environment overrides on top of file values.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for var in API_KEY_ENV_VARS {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                self.api_key = Some(key);
                return;
            }
        }
    }
}

/// The profiler state directory (`~/.csr-profiler`)
pub fn state_dir() -> Result<PathBuf, ProfilerError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProfilerError::Configuration("Could not find home directory".to_string()))?;
    Ok(home.join(".csr-profiler"))
}

/// Get the canonical config file path (`~/.csr-profiler/config.json`)
pub fn config_path() -> Result<PathBuf, ProfilerError> {
    Ok(state_dir()?.join("config.json"))
}

/// Load configuration from disk plus environment.
///
/// A missing file is not an error; a file that fails to parse is.
pub fn load_config() -> Result<Config, ProfilerError> {
    let mut config = read_config_file(&config_path()?)?;
    config.apply_env(|var| std::env::var(var).ok());
    if config.resolved_api_key().is_none() {
        log::warn!("API key not set. AI-dependent commands are disabled.");
    }
    Ok(config)
}

fn read_config_file(path: &std::path::Path) -> Result<Config, ProfilerError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| ProfilerError::Configuration(format!("Failed to read config: {}", e)))?;
    serde_json::from_str(&content)
        .map_err(|e| ProfilerError::Configuration(format!("Failed to parse config: {}", e)))
}

/// Create or update config.json.
///
/// Reads the file (defaults if absent, environment ignored so env keys are
/// never written to disk), applies the mutator, ensures the directory exists,
/// and writes back.
pub fn create_or_update_config(
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, ProfilerError> {
    let path = config_path()?;
    write_config_with(&path, mutator)
}

fn write_config_with(
    path: &std::path::Path,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, ProfilerError> {
    let mut config = read_config_file(path)?;
    mutator(&mut config);

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| ProfilerError::Io(format!("Failed to create config dir: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| ProfilerError::Configuration(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, content)
        .map_err(|e| ProfilerError::Io(format!("Failed to write config: {}", e)))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.csv_name_header, "Names of Organisation");
        assert_eq!(config.csv_cin_header, "CIN");
        assert!(config.resolved_api_key().is_none());
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.resolved_api_key().is_none());
    }

    #[test]
    fn test_env_override_order() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        config.apply_env(|var| match var {
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.resolved_api_key().as_deref(), Some("fallback"));

        config.apply_env(|var| match var {
            "GEMINI_API_KEY" => Some("primary".to_string()),
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.resolved_api_key().as_deref(), Some("primary"));
    }

    #[test]
    fn test_env_absent_keeps_file_key() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        config.apply_env(|_| None);
        assert_eq!(config.resolved_api_key().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_config_file(&path),
            Err(ProfilerError::Configuration(_))
        ));
    }

    #[test]
    fn test_write_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        write_config_with(&path, |c| c.model = "gemini-test".to_string()).unwrap();
        let config = read_config_file(&path).unwrap();
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }
}
