//! Alias table source.
//!
//! The alias table maps real identifiers found in the corpus to the
//! pseudonyms that replace them before any text leaves the process.

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("alias table must be a JSON object of string values: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse a `{"real identifier": "alias"}` JSON object.
///
/// Blank input yields an empty table.
pub fn parse_alias_json(raw: &str) -> Result<BTreeMap<String, String>, AliasError> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Merge the settings-file table with the raw env value.
///
/// Env entries override settings entries with the same identifier. A
/// malformed env value is logged and ignored.
pub fn resolve_aliases(
    from_settings: &BTreeMap<String, String>,
    from_env: Option<&str>,
) -> BTreeMap<String, String> {
    let mut aliases = from_settings.clone();
    if let Some(raw) = from_env {
        match parse_alias_json(raw) {
            Ok(parsed) => aliases.extend(parsed),
            Err(error) => {
                tracing::error!(%error, "Failed to parse ANONYMIZATION_ALIASES");
            }
        }
    }
    aliases
}
