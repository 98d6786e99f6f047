//! Secrets configuration loaded from environment variables only.
//!
//! API keys, the database URL and the anonymization alias table are
//! sensitive and must never be written to the TOML settings file.

use std::env;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const LLM_MODEL: &str = "LLM_MODEL";
pub const ANONYMIZATION_ALIASES: &str = "ANONYMIZATION_ALIASES";

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI-compatible API key used for embeddings and generation (env: OPENAI_API_KEY)
    pub openai_api_key: String,

    /// Postgres connection string for the vector store (env: DATABASE_URL)
    pub database_url: String,

    /// Generation model override (env: LLM_MODEL)
    pub llm_model: Option<String>,

    /// Raw JSON object mapping real identifiers to pseudonyms (env: ANONYMIZATION_ALIASES)
    pub anonymization_aliases: Option<String>,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Loads a `.env` file first if present (development convenience).
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Load from the process environment without touching `.env`.
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        Ok(Self {
            openai_api_key: required(OPENAI_API_KEY)?,
            database_url: required(DATABASE_URL)?,
            llm_model: optional(LLM_MODEL),
            anonymization_aliases: optional(ANONYMIZATION_ALIASES),
        })
    }
}

fn required(key: &'static str) -> Result<String, SecretsError> {
    optional(key).ok_or(SecretsError::MissingSecret(key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
