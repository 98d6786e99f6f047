//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in the XDG config directory
//! (`~/.config/kataribe/config.toml`) unless `KATARIBE_CONFIG_DIR` overrides it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# kataribe configuration file
# Located at: ~/.config/kataribe/config.toml
#
# This file contains non-sensitive configuration.
# Secrets are loaded from environment variables:
#   - OPENAI_API_KEY
#   - DATABASE_URL
#   - LLM_MODEL (optional, overrides [generation].model)
#   - ANONYMIZATION_ALIASES (optional JSON object, merged over [anonymization.aliases])

[embedding]
base_url = "https://api.openai.com/v1"
model = "text-embedding-3-small"
# dimensions = 1536

[generation]
base_url = "https://api.openai.com/v1"
model = "gpt-4o"
temperature = 1.0
# max_tokens = 2048
request_timeout_seconds = 120

[store]
table = "discord_messages"
max_connections = 8
min_ef_search = 40

[search]
default_limit = 50

[logging]
level = "info"

[anonymization.aliases]
# "Real Name" = "Pseudonym"
"#;

/// Settings loaded from TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Embedding endpoint configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Generation endpoint configuration
    #[serde(default)]
    pub generation: LlmSettings,

    /// Vector store configuration
    #[serde(default)]
    pub store: StoreSettings,

    /// Search defaults
    #[serde(default)]
    pub search: SearchSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Alias table entries kept in the settings file
    #[serde(default)]
    pub anonymization: AnonymizationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Expected vector length. Checked against every embedding when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Table holding `(chunk_id, content, embedding, message_date)` rows
    #[serde(default = "default_store_table")]
    pub table: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Lower bound for `hnsw.ef_search`; the effective value is never below the requested limit.
    #[serde(default = "default_min_ef_search")]
    pub min_ef_search: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnonymizationSettings {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_embedding_model(),
            dimensions: None,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            table: default_store_table(),
            max_connections: default_max_connections(),
            min_ef_search: default_min_ef_search(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_generation_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_request_timeout_seconds() -> u64 {
    120
}

fn default_store_table() -> String {
    "discord_messages".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_min_ef_search() -> usize {
    40
}

fn default_search_limit() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("KATARIBE_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("kataribe");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert!(settings.embedding.dimensions.is_none());
        assert_eq!(settings.generation.model, "gpt-4o");
        assert_eq!(settings.generation.temperature, 1.0);
        assert!(settings.generation.max_tokens.is_none());
        assert_eq!(settings.store.table, "discord_messages");
        assert_eq!(settings.store.min_ef_search, 40);
        assert_eq!(settings.search.default_limit, 50);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.anonymization.aliases.is_empty());
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = Settings::from_toml(DEFAULT_CONFIG_TOML).unwrap();
        let defaults = Settings::default();

        assert_eq!(parsed.embedding.base_url, defaults.embedding.base_url);
        assert_eq!(parsed.embedding.model, defaults.embedding.model);
        assert_eq!(parsed.generation.model, defaults.generation.model);
        assert_eq!(
            parsed.generation.request_timeout_seconds,
            defaults.generation.request_timeout_seconds
        );
        assert_eq!(parsed.store.table, defaults.store.table);
        assert_eq!(parsed.store.max_connections, defaults.store.max_connections);
        assert_eq!(parsed.search.default_limit, defaults.search.default_limit);
        assert!(parsed.anonymization.aliases.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[generation]
model = "gpt-4o-mini"
max_tokens = 1024

[anonymization.aliases]
"アキラ" = "太郎"
"#;
        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.generation.model, "gpt-4o-mini");
        assert_eq!(settings.generation.max_tokens, Some(1024));
        assert_eq!(settings.generation.temperature, 1.0);
        assert_eq!(settings.store.min_ef_search, 40);
        assert_eq!(
            settings.anonymization.aliases.get("アキラ").map(String::as_str),
            Some("太郎")
        );
    }

    #[test]
    fn test_config_path_uses_env_override() {
        let _lock = crate::config::secrets::tests::ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let value = dir.path().to_string_lossy().to_string();

        // SAFETY: test-scoped env mutation.
        unsafe { std::env::set_var("KATARIBE_CONFIG_DIR", &value) };
        let path = Settings::config_path().unwrap();
        let loaded = Settings::load().unwrap();
        // SAFETY: test-scoped env mutation cleanup.
        unsafe { std::env::remove_var("KATARIBE_CONFIG_DIR") };

        assert_eq!(path, dir.path().join("config.toml"));
        assert!(path.exists());
        assert_eq!(loaded.store.table, "discord_messages");
    }
}
