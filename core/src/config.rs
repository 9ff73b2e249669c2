//! Configuration system for TalentScope
//!
//! Configuration is loaded from a JSON file with environment variable
//! overrides. Every field has a default, so an empty object is a valid config.

use crate::error::{ConfigError, Result, UnknownName};
use crate::rbac::RbacConfig;
use crate::session::{JsonFileSessionStorage, MemorySessionStorage, SessionStorage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::fs;

/// Where the authenticated user is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process memory only; nothing survives a restart
    Memory,
    /// A JSON file in the session directory
    #[default]
    File,
}

impl FromStr for SessionBackend {
    type Err = UnknownName;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "file" => Ok(SessionBackend::File),
            _ => Err(UnknownName {
                kind: "session backend",
                value: s.to_string(),
            }),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    /// Fixed name the session is stored under
    #[serde(default = "default_session_key")]
    pub key: String,
    /// Session directory for the file backend, defaults to `~/.talentscope/sessions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            key: default_session_key(),
            dir: None,
        }
    }
}

fn default_session_key() -> String {
    crate::session::DEFAULT_SESSION_KEY.to_string()
}

impl SessionConfig {
    /// Resolved session directory
    pub fn dir_path(&self) -> PathBuf {
        self.dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| get_data_dir().join("sessions"))
    }

    /// Build the configured storage backend
    pub fn build_storage(&self) -> Arc<dyn SessionStorage> {
        match self.backend {
            SessionBackend::Memory => Arc::new(MemorySessionStorage::new(self.key.clone())),
            SessionBackend::File => {
                Arc::new(JsonFileSessionStorage::new(self.dir_path(), &self.key))
            }
        }
    }
}

/// Root configuration for TalentScope
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Access control configuration
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.rbac.validate().map_err(ConfigError::Invalid)?;
        if self.session.key.trim().is_empty() {
            return Err(ConfigError::Invalid("Session key must not be empty".to_string()).into());
        }
        Ok(())
    }
}

/// Expand tilde in path
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Get the default config directory
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".talentscope")
}

/// Get the config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

/// Get the data directory
pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}

/// Load configuration from the default path
pub async fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()).await
}

/// Load configuration from a file, apply environment overrides and validate
pub async fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let contents = fs::read_to_string(path).await?;

    let mut config: Config = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::Parse(format!("Failed to parse config JSON: {}", e)))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Apply environment variable overrides to config.
///
/// `TALENTSCOPE_SESSION_DIR` and `TALENTSCOPE_SESSION_BACKEND` override the
/// session section. Unknown backend values are ignored.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("TALENTSCOPE_SESSION_DIR").filter(|d| !d.trim().is_empty()) {
        tracing::debug!("Session directory from environment: {}", dir);
        config.session.dir = Some(dir);
    }

    if let Some(value) = lookup("TALENTSCOPE_SESSION_BACKEND") {
        match value.parse::<SessionBackend>() {
            Ok(backend) => config.session.backend = backend,
            Err(e) => tracing::warn!("Ignoring TALENTSCOPE_SESSION_BACKEND: {}", e),
        }
    }
}

/// Save configuration to the default path
pub async fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path()).await
}

/// Save configuration to a file
pub async fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, json).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TalentScopeError;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.backend, SessionBackend::File);
        assert_eq!(config.session.key, "talentscope_user");
        assert_eq!(config.rbac.systems.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.session.key, Config::default().session.key);
        assert!(!config.rbac.audit);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TALENTSCOPE_SESSION_DIR", "/tmp/ts-sessions"),
            ("TALENTSCOPE_SESSION_BACKEND", "Memory"),
        ]);
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.session.backend, SessionBackend::Memory);
        assert_eq!(config.session.dir_path(), PathBuf::from("/tmp/ts-sessions"));
    }

    #[test]
    fn test_unknown_backend_override_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| {
            (k == "TALENTSCOPE_SESSION_BACKEND").then(|| "redis".to_string())
        });
        assert_eq!(config.session.backend, SessionBackend::File);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(" Memory ".parse::<SessionBackend>(), Ok(SessionBackend::Memory));
        assert_eq!("FILE".parse::<SessionBackend>(), Ok(SessionBackend::File));
        let err = "redis".parse::<SessionBackend>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown session backend 'redis'");
    }

    #[test]
    fn test_config_paths() {
        let config_dir = get_config_dir();
        assert!(get_config_path().starts_with(&config_dir));
        assert!(Config::default().session.dir_path().starts_with(&config_dir));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.rbac.audit = true;
        config.session.dir = Some(temp_dir.path().to_string_lossy().to_string());
        save_config_to(&config, &path).await.unwrap();

        let loaded = load_config_from(&path).await.unwrap();
        assert!(loaded.rbac.audit);
        assert_eq!(loaded.rbac.systems, config.rbac.systems);
    }

    #[tokio::test]
    async fn test_load_missing_and_invalid() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, TalentScopeError::Config(ConfigError::NotFound(_))));

        tokio::fs::write(&path, r#"{"rbac":{"systems":[]}}"#).await.unwrap();
        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, TalentScopeError::Config(ConfigError::Invalid(_))));

        tokio::fs::write(&path, "not json").await.unwrap();
        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, TalentScopeError::Config(ConfigError::Parse(_))));
    }
}
