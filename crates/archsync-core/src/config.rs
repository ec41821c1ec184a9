//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/archsync/config.toml)
//! 3. Environment variables (ARCHSYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::Credentials;

/// Environment variable prefix
const ENV_PREFIX: &str = "ARCHSYNC";

/// Default remote API endpoint
pub const DEFAULT_API_URL: &str = "https://api.structurizr.com";

/// Keys accepted by [`Config::set`]
pub const KEYS: &[&str] = &[
    "api_url",
    "api_key",
    "api_secret",
    "workspace_id",
    "merge_from_remote",
    "timeout_secs",
    "log_level",
];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote workspace API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_secret: Option<String>,

    /// Remote workspace to push to / pull from
    #[serde(default)]
    pub workspace_id: Option<String>,

    /// Carry layout over from the remote copy before uploading
    #[serde(default = "default_true")]
    pub merge_from_remote: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log filter, e.g. "info" or "archsync_core=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            api_secret: None,
            workspace_id: None,
            merge_from_remote: true,
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ARCHSYNC_API_URL, ARCHSYNC_API_KEY, ...)
    /// 2. Config file (~/.config/archsync/config.toml or ARCHSYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
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
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = env_var("API_URL") {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // Empty strings clear optional values
        if let Some(val) = env_var("API_KEY") {
            self.api_key = optional(val);
        }
        if let Some(val) = env_var("API_SECRET") {
            self.api_secret = optional(val);
        }
        if let Some(val) = env_var("WORKSPACE_ID") {
            self.workspace_id = optional(val);
        }

        if let Some(val) = env_var("MERGE_FROM_REMOTE") {
            self.merge_from_remote = parse_bool(&val);
        }

        if let Some(val) = env_var("TIMEOUT_SECS") {
            match val.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid ARCHSYNC_TIMEOUT_SECS"),
            }
        }

        if let Some(val) = env_var("LOG") {
            if !val.is_empty() {
                self.log_level = val;
            }
        }
    }

    /// Set a single key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                if value.trim().is_empty() {
                    bail!("api_url cannot be empty");
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "api_key" => self.api_key = optional(value.to_string()),
            "api_secret" => self.api_secret = optional(value.to_string()),
            "workspace_id" => self.workspace_id = optional(value.to_string()),
            "merge_from_remote" => {
                self.merge_from_remote = match value.to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    other => bail!("Invalid boolean for merge_from_remote: '{}'", other),
                }
            }
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid number for timeout_secs: '{}'", value))?;
            }
            "log_level" => self.log_level = value.to_string(),
            other => bail!(
                "Unknown config key: '{}'. Valid keys: {}",
                other,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ARCHSYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("archsync")
            .join("config.toml")
    }

    /// API credentials, if both key and secret are configured
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Some(Credentials::new(key.clone(), secret.clone())),
            _ => None,
        }
    }

    /// The secret with all but its last four characters hidden
    pub fn masked_secret(&self) -> Option<String> {
        self.api_secret.as_deref().map(mask)
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix)).ok()
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

pub(crate) fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
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
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
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
        "ARCHSYNC_CONFIG",
        "ARCHSYNC_API_URL",
        "ARCHSYNC_API_KEY",
        "ARCHSYNC_API_SECRET",
        "ARCHSYNC_WORKSPACE_ID",
        "ARCHSYNC_MERGE_FROM_REMOTE",
        "ARCHSYNC_TIMEOUT_SECS",
        "ARCHSYNC_LOG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.structurizr.com");
        assert!(config.merge_from_remote);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_env_override_credentials() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ARCHSYNC_API_KEY", "key");
        env::set_var("ARCHSYNC_API_SECRET", "secret");
        env::set_var("ARCHSYNC_WORKSPACE_ID", "1234");
        config.apply_env_overrides();

        assert_eq!(config.workspace_id.as_deref(), Some("1234"));
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.api_key(), "key");

        // Empty string clears it
        env::set_var("ARCHSYNC_API_KEY", "");
        config.apply_env_overrides();
        assert!(config.api_key.is_none());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_env_override_merge_flag() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ARCHSYNC_MERGE_FROM_REMOTE", "false");
        config.apply_env_overrides();
        assert!(!config.merge_from_remote);

        env::set_var("ARCHSYNC_MERGE_FROM_REMOTE", "1");
        config.apply_env_overrides();
        assert!(config.merge_from_remote);
    }

    #[test]
    fn test_env_override_invalid_timeout_ignored() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("ARCHSYNC_TIMEOUT_SECS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.timeout_secs, 30);

        env::set_var("ARCHSYNC_TIMEOUT_SECS", "5");
        config.apply_env_overrides();
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "http://localhost:8080"
            workspace_id = "42"
            merge_from_remote = false
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.workspace_id.as_deref(), Some("42"));
        assert!(!config.merge_from_remote);
        // Unset keys fall back to defaults
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("workspace_id", "77").unwrap();
        config.set("timeout_secs", "10").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("timeout_secs", "ten").is_err());
        assert!(config.set("merge_from_remote", "maybe").is_err());
        assert!(config.set("api_url", " ").is_err());

        config.set("api_url", "http://localhost:8080/").unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_masked_secret() {
        let mut config = Config::default();
        assert!(config.masked_secret().is_none());

        config.api_secret = Some("abcdefgh".to_string());
        assert_eq!(config.masked_secret().as_deref(), Some("****efgh"));

        config.api_secret = Some("abc".to_string());
        assert_eq!(config.masked_secret().as_deref(), Some("****"));
    }
}
