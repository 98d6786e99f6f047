//! Identifier anonymization.
//!
//! Real identifiers are replaced by pseudonyms before any corpus text leaves
//! the process. Longer identifiers are always replaced first so that
//! `"ユウキさん"` is substituted whole before `"ユウキ"` can eat its prefix.

use std::collections::BTreeMap;

use crate::models::SearchResult;

/// Immutable `real identifier -> pseudonym` table.
///
/// Pairs with an empty identifier or alias are dropped on construction.
/// The remaining pairs are kept longest identifier first (ties broken by
/// identifier, so iteration order never depends on input order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    pairs: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = entries
            .into_iter()
            .map(|(identifier, alias)| (identifier.into(), alias.into()))
            .filter(|(identifier, alias)| !identifier.is_empty() && !alias.is_empty())
            .collect();
        pairs.sort_by(|(a, _), (b, _)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        pairs.dedup_by(|(a, _), (b, _)| a == b);
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in replacement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(identifier, alias)| (identifier.as_str(), alias.as_str()))
    }
}

impl From<BTreeMap<String, String>> for AliasTable {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::new(map)
    }
}

/// Replace every configured identifier in `text` with its pseudonym.
///
/// `str::replace` matches literally, so identifiers containing characters
/// such as `.` or `(` need no escaping.
pub fn sanitize(text: &str, aliases: &AliasTable) -> String {
    let mut content = text.to_string();
    for (identifier, alias) in aliases.iter() {
        if content.contains(identifier) {
            content = content.replace(identifier, alias);
        }
    }
    content
}

/// Sanitize the content of each result, leaving every other field as-is.
pub fn sanitize_results(results: &[SearchResult], aliases: &AliasTable) -> Vec<SearchResult> {
    results
        .iter()
        .map(|result| SearchResult {
            content: sanitize(&result.content, aliases),
            ..result.clone()
        })
        .collect()
}
