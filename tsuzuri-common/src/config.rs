//! Configuration loading and resolution
//!
//! Settings are resolved in this priority order:
//! 1. Command-line argument (applied by the binary, highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! A missing config file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TSUZURI_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file. Falls back to the OS data directory.
    pub database_path: Option<PathBuf>,

    /// Interface to bind the HTTP server on
    pub host: String,

    /// HTTP server port
    pub port: u16,

    pub logging: LoggingConfig,

    pub generative: GenerativeConfig,

    pub practice: PracticeConfig,

    pub http: HttpConfig,

    /// File the values were read from; `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: "127.0.0.1".to_string(),
            port: 8000,
            logging: LoggingConfig::default(),
            generative: GenerativeConfig::default(),
            practice: PracticeConfig::default(),
            http: HttpConfig::default(),
            source: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Generative text service connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    /// Base URL of an OpenAI-compatible API (without trailing `/chat/completions`)
    pub base_url: String,

    /// Bearer token; `None` leaves the prompt endpoint answering 502
    pub api_key: Option<String>,

    pub model: String,

    /// Output-length cap passed with every request
    pub max_output_tokens: u32,

    /// Transport-level timeout for one generation call
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_output_tokens: 800,
            timeout_secs: 30,
        }
    }
}

/// Practice-session behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Category used when a prompt request does not name one
    pub default_category: String,

    /// Number of most recent records returned with the account profile
    pub history_limit: i64,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            default_category: "general".to_string(),
            history_limit: 10,
        }
    }
}

/// HTTP surface settings (CORS, cookies and sessions)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Origins allowed to call the API with credentials.
    /// Empty means any origin, without credentials.
    pub cors_allowed_origins: Vec<String>,

    /// Add the `Secure` attribute to session and CSRF cookies
    pub secure_cookies: bool,

    /// Session lifetime in seconds, counted from login
    pub session_max_age_secs: i64,
}

impl HttpConfig {
    /// Session lifetime as a duration
    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.session_max_age_secs)
            .unwrap_or_else(|| chrono::Duration::weeks(52 * 100))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            secure_cookies: false,
            session_max_age_secs: 1_209_600, // two weeks
        }
    }
}

impl TomlConfig {
    /// Load configuration from an explicit file, or from the default location.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file silently yields built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using built-in defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        if config.http.session_max_age_secs <= 0 {
            return Err(Error::Config(format!(
                "session_max_age_secs must be positive, got {}",
                config.http.session_max_age_secs
            )));
        }
        debug!("Parsed configuration from {}", path.display());
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Overlay environment variables on top of file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay values produced by `lookup` (an environment-like source).
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("TSUZURI_DATABASE_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(host) = get("TSUZURI_HOST") {
            self.host = host;
        }
        if let Some(port) = get("TSUZURI_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid TSUZURI_PORT: {}", port)))?;
        }
        if let Some(level) = get("TSUZURI_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(url) = get("TSUZURI_GENERATIVE_BASE_URL") {
            self.generative.base_url = url;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.generative.api_key = Some(key);
        }
        if let Some(model) = get("TSUZURI_MODEL") {
            self.generative.model = model;
        }
        if let Some(origins) = get("TSUZURI_CORS_ALLOWED_ORIGINS") {
            self.http.cors_allowed_origins = split_list(&origins);
        }
        if let Some(secure) = get("TSUZURI_SECURE_COOKIES") {
            self.http.secure_cookies = matches!(secure.trim(), "1" | "true" | "yes");
        }
        if let Some(max_age) = get("TSUZURI_SESSION_MAX_AGE") {
            self.http.session_max_age_secs = max_age
                .trim()
                .parse()
                .ok()
                .filter(|secs: &i64| *secs > 0)
                .ok_or_else(|| {
                    Error::Config(format!("Invalid TSUZURI_SESSION_MAX_AGE: {}", max_age))
                })?;
        }
        Ok(())
    }

    /// Database path, falling back to the OS data directory
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Split a comma-separated list, dropping empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Default config file location (`~/.config/tsuzuri/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("tsuzuri").join("config.toml"))
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tsuzuri").join("tsuzuri.db"))
        .unwrap_or_else(|| PathBuf::from("./tsuzuri_data/tsuzuri.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_complete() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.practice.history_limit, 10);
        assert_eq!(config.generative.max_output_tokens, 800);
        assert!(config.generative.api_key.is_none());
        assert!(config.http.cors_allowed_origins.is_empty());
        assert_eq!(config.http.session_max_age_secs, 14 * 24 * 60 * 60);
        assert!(config.source.is_none());
    }

    #[test]
    fn session_max_age_must_be_positive() {
        let mut config = TomlConfig::default();
        config
            .apply_env_from(|name| (name == "TSUZURI_SESSION_MAX_AGE").then(|| "3600".to_string()))
            .unwrap();
        assert_eq!(config.http.session_max_age_secs, 3600);

        let result = config
            .apply_env_from(|name| (name == "TSUZURI_SESSION_MAX_AGE").then(|| "0".to_string()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("TSUZURI_PORT", "9100"),
            ("OPENAI_API_KEY", "sk-test"),
            ("TSUZURI_CORS_ALLOWED_ORIGINS", "http://localhost:3000, ,http://127.0.0.1:3000"),
        ]
        .into_iter()
        .collect();

        let mut config = TomlConfig::default();
        config
            .apply_env_from(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.generative.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.http.cors_allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    fn invalid_port_is_config_error() {
        let mut config = TomlConfig::default();
        let result = config.apply_env_from(|name| {
            (name == "TSUZURI_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = TomlConfig::default();
        config
            .apply_env_from(|name| (name == "TSUZURI_MODEL").then(|| "   ".to_string()))
            .unwrap();
        assert_eq!(config.generative.model, "gpt-4o-mini");
    }
}
