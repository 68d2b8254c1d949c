//! Server configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ai::{openai, tavily};

const PLACEHOLDER_OPENAI_KEY: &str = "your_openai_api_key_here";
const PLACEHOLDER_TAVILY_KEY: &str = "your_tavily_api_key_here";
const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Startup configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not configured")]
    MissingKey(&'static str),

    #[error("{0} still holds the placeholder value")]
    PlaceholderKey(&'static str),

    #[error("Failed to read secrets file {path}: {source}")]
    SecretsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid secrets file {path}: {source}")]
    SecretsParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Credentials file layout
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
    #[serde(rename = "TAVILY_API_KEY")]
    tavily_api_key: Option<String>,
}

/// Server configuration loaded from environment variables and a secrets file
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub cors_origins: Vec<String>,
    pub openai_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub tavily_base_url: String,
    pub request_timeout_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: env_opt("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            cors_origins: env_opt("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            tavily_api_key: env_opt("TAVILY_API_KEY"),
            openai_model: env_opt("OPENAI_MODEL").unwrap_or_else(|| openai::DEFAULT_MODEL.into()),
            openai_base_url: env_opt("OPENAI_BASE_URL")
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.into()),
            tavily_base_url: env_opt("TAVILY_BASE_URL")
                .unwrap_or_else(|| tavily::DEFAULT_BASE_URL.into()),
            request_timeout_secs: env_opt("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from the environment, filling missing credentials from the
    /// secrets file named by `HEALTHBUDDY_SECRETS` (default `secrets.toml`).
    ///
    /// A missing default file is fine; a missing explicitly named file is not.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_env();

        let (path, explicit) = match env_opt("HEALTHBUDDY_SECRETS") {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(DEFAULT_SECRETS_PATH), false),
        };

        if explicit || path.exists() {
            config.merge_secrets_file(&path)?;
        }

        Ok(config)
    }

    /// Fill credentials not already set from a TOML secrets file
    pub fn merge_secrets_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::SecretsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let secrets: Secrets = toml::from_str(&text).map_err(|source| ConfigError::SecretsParse {
            path: path.to_path_buf(),
            source,
        })?;

        if self.openai_api_key.is_none() {
            self.openai_api_key = secrets.openai_api_key.filter(|k| !k.trim().is_empty());
        }
        if self.tavily_api_key.is_none() {
            self.tavily_api_key = secrets.tavily_api_key.filter(|k| !k.trim().is_empty());
        }
        Ok(())
    }

    /// Check both credentials are present and not left at their placeholders
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_key(
            self.openai_api_key.as_deref(),
            "OPENAI_API_KEY",
            PLACEHOLDER_OPENAI_KEY,
        )?;
        check_key(
            self.tavily_api_key.as_deref(),
            "TAVILY_API_KEY",
            PLACEHOLDER_TAVILY_KEY,
        )
    }

    /// Human-readable credential status for the health endpoint
    pub fn key_status(&self) -> (bool, String) {
        match self.validate() {
            Ok(()) => (true, "API keys configured".to_string()),
            Err(e) => (false, e.to_string()),
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn check_key(key: Option<&str>, name: &'static str, placeholder: &str) -> Result<(), ConfigError> {
    match key {
        None => Err(ConfigError::MissingKey(name)),
        Some(k) if k == placeholder => Err(ConfigError::PlaceholderKey(name)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bare() -> Config {
        Config {
            bind_address: "127.0.0.1:0".to_string(),
            cors_origins: vec!["*".to_string()],
            openai_api_key: None,
            tavily_api_key: None,
            openai_model: openai::DEFAULT_MODEL.to_string(),
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            tavily_base_url: tavily::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn missing_keys_fail_validation() {
        let config = bare();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingKey("OPENAI_API_KEY"))
        ));
        let (ok, message) = config.key_status();
        assert!(!ok);
        assert_eq!(message, "OPENAI_API_KEY not configured");
    }

    #[test]
    fn placeholder_keys_are_rejected() {
        let mut config = bare();
        config.openai_api_key = Some("sk-real".to_string());
        config.tavily_api_key = Some(PLACEHOLDER_TAVILY_KEY.to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PlaceholderKey("TAVILY_API_KEY"))
        ));
    }

    #[test]
    fn secrets_file_fills_missing_keys_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OPENAI_API_KEY = \"sk-from-file\"").unwrap();
        writeln!(file, "TAVILY_API_KEY = \"tvly-from-file\"").unwrap();

        let mut config = bare();
        config.openai_api_key = Some("sk-from-env".to_string());
        config.merge_secrets_file(file.path()).unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.tavily_api_key.as_deref(), Some("tvly-from-file"));
        assert_eq!(config.key_status(), (true, "API keys configured".to_string()));
    }

    #[test]
    fn malformed_secrets_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OPENAI_API_KEY = ").unwrap();

        let err = bare().merge_secrets_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SecretsParse { .. }));
    }

    #[test]
    fn unreadable_secrets_file_is_an_error() {
        let err = bare()
            .merge_secrets_file(Path::new("/nonexistent/healthbuddy/secrets.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::SecretsRead { .. }));
    }
}
