pub mod config;

pub use config::{
    AliasError, AnonymizationSettings, Config, ConfigError, EmbeddingSettings, LlmSettings,
    LoggingSettings, SearchSettings, Secrets, SecretsError, Settings, SettingsError,
    StoreSettings, load_dotenv, parse_alias_json, resolve_aliases,
};
