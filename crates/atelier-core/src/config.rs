//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/atelier/config.toml)
//! 3. Environment variables (ATELIER_* prefix)
//!
//! Environment variables take precedence over config file values. The
//! Notion service credential is held server-side only and never echoed
//! back to callers of the sync subsystem.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "ATELIER";

/// Notion API version header value sent on every request
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Default Notion API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Notion connection settings
    #[serde(default)]
    pub notion: NotionConfig,
}

/// Connection settings for the Notion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token (service-level bearer credential)
    #[serde(default)]
    pub token: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fixed API version header value
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Database holding project pages
    #[serde(default)]
    pub project_database_id: Option<String>,

    /// Database holding work-log pages; pushes fail remotely when unset
    #[serde(default)]
    pub work_log_database_id: Option<String>,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            project_database_id: None,
            work_log_database_id: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            notion: NotionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ATELIER_DATA_DIR, ATELIER_NOTION_TOKEN, ...)
    /// 2. Config file (~/.config/atelier/config.toml or ATELIER_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_NOTION_TOKEN", ENV_PREFIX)) {
            self.notion.token = val;
        }

        if let Ok(val) = std::env::var(format!("{}_NOTION_BASE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.notion.base_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_PROJECT_DB", ENV_PREFIX)) {
            self.notion.project_database_id = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_WORK_LOG_DB", ENV_PREFIX)) {
            self.notion.work_log_database_id = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ATELIER_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atelier")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("atelier.db")
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "ATELIER_DATA_DIR",
        "ATELIER_NOTION_TOKEN",
        "ATELIER_NOTION_BASE_URL",
        "ATELIER_PROJECT_DB",
        "ATELIER_WORK_LOG_DB",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.notion.token.is_empty());
        assert_eq!(config.notion.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.notion.api_version, DEFAULT_API_VERSION);
        assert!(config.data_dir.ends_with("atelier"));
    }

    #[test]
    fn test_env_override_token() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ATELIER_NOTION_TOKEN", "secret_abc");
        config.apply_env_overrides();

        assert_eq!(config.notion.token, "secret_abc");
    }

    #[test]
    fn test_env_override_databases() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ATELIER_PROJECT_DB", "db-one");
        env::set_var("ATELIER_WORK_LOG_DB", "db-two");
        config.apply_env_overrides();

        assert_eq!(config.notion.project_database_id.as_deref(), Some("db-one"));
        assert_eq!(
            config.notion.work_log_database_id.as_deref(),
            Some("db-two")
        );

        // Empty string clears them
        env::set_var("ATELIER_PROJECT_DB", "");
        config.apply_env_overrides();
        assert!(config.notion.project_database_id.is_none());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"

            [notion]
            token = "secret_xyz"
            work_log_database_id = "logdb"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.notion.token, "secret_xyz");
        assert_eq!(config.notion.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.notion.work_log_database_id.as_deref(), Some("logdb"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let dir = tempfile::tempdir().unwrap();
        env::set_var("ATELIER_DATA_DIR", dir.path().join("data").to_str().unwrap());

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.notion.token.is_empty());
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        config.notion.token = "secret".to_string();
        config.notion.project_database_id = Some("abc".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.notion.token, "secret");
        assert_eq!(parsed.notion.project_database_id.as_deref(), Some("abc"));
    }
}
