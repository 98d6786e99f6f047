//! Configuration management for kataribe.
//!
//! Secrets (from environment variables) are kept apart from settings
//! (from a TOML file).
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - key for the embedding and generation endpoints
//! - `DATABASE_URL` - Postgres connection string for the vector store
//! - `LLM_MODEL` - optional generation model override
//! - `ANONYMIZATION_ALIASES` - optional JSON alias table
//!
//! ## Settings (TOML File)
//! Located at `~/.config/kataribe/config.toml`:
//! ```toml
//! [generation]
//! model = "gpt-4o"
//!
//! [store]
//! table = "discord_messages"
//! min_ef_search = 40
//!
//! [anonymization.aliases]
//! "Real Name" = "Pseudonym"
//! ```

pub mod aliases;
pub(crate) mod secrets;
mod settings;

use std::collections::BTreeMap;

pub use aliases::{AliasError, parse_alias_json, resolve_aliases};
pub use secrets::{Secrets, SecretsError};
pub use settings::{
    AnonymizationSettings, EmbeddingSettings, LlmSettings, LoggingSettings, SearchSettings,
    Settings, SettingsError, StoreSettings,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Store table name must not be empty")]
    EmptyStoreTable,

    #[error("Embedding model must not be empty")]
    EmptyEmbeddingModel,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `OPENAI_API_KEY` or `DATABASE_URL` is missing
    /// - The TOML file cannot be read or parsed
    /// - The settings leave a required value blank
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        Self::new(secrets, settings)
    }

    /// Validate and combine already-loaded parts.
    pub fn new(secrets: Secrets, settings: Settings) -> Result<Self, ConfigError> {
        if settings.store.table.trim().is_empty() {
            return Err(ConfigError::EmptyStoreTable);
        }
        if settings.embedding.model.trim().is_empty() {
            return Err(ConfigError::EmptyEmbeddingModel);
        }
        Ok(Self { secrets, settings })
    }

    /// Generation model: `LLM_MODEL` wins over the settings file.
    pub fn generation_model(&self) -> &str {
        self.secrets
            .llm_model
            .as_deref()
            .unwrap_or(&self.settings.generation.model)
    }

    /// Resolved alias table (settings file merged with `ANONYMIZATION_ALIASES`).
    pub fn aliases(&self) -> BTreeMap<String, String> {
        resolve_aliases(
            &self.settings.anonymization.aliases,
            self.secrets.anonymization_aliases.as_deref(),
        )
    }

    pub fn openai_api_key(&self) -> &str {
        &self.secrets.openai_api_key
    }

    pub fn database_url(&self) -> &str {
        &self.secrets.database_url
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Secrets {
        Secrets {
            openai_api_key: "sk-test".to_string(),
            database_url: "postgres://localhost/kataribe".to_string(),
            llm_model: None,
            anonymization_aliases: None,
        }
    }

    #[test]
    fn test_generation_model_override() {
        let config = Config::new(secrets(), Settings::default()).unwrap();
        assert_eq!(config.generation_model(), "gpt-4o");

        let mut overridden = secrets();
        overridden.llm_model = Some("gpt-4o-mini".to_string());
        let config = Config::new(overridden, Settings::default()).unwrap();
        assert_eq!(config.generation_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_empty_table_rejected() {
        let mut settings = Settings::default();
        settings.store.table = " ".to_string();
        assert!(matches!(
            Config::new(secrets(), settings),
            Err(ConfigError::EmptyStoreTable)
        ));
    }

    #[test]
    fn test_aliases_resolved_from_both_sources() {
        let mut settings = Settings::default();
        settings
            .anonymization
            .aliases
            .insert("ヒロシ".to_string(), "花子".to_string());
        let mut with_env = secrets();
        with_env.anonymization_aliases = Some(r#"{"アキラ":"太郎"}"#.to_string());

        let config = Config::new(with_env, settings).unwrap();
        let aliases = config.aliases();
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases["アキラ"], "太郎");
        assert_eq!(aliases["ヒロシ"], "花子");
    }

    #[test]
    fn test_no_aliases_configured() {
        let config = Config::new(secrets(), Settings::default()).unwrap();
        assert!(config.aliases().is_empty());
    }
}
