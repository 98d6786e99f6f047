use std::sync::Arc;

use crate::errors::{RagError, RagResult};
use crate::models::{NearestQuery, SearchResult};
use crate::store::ChunkStore;

pub const MAX_SEARCH_LIMIT: usize = 200;
pub const MAX_TOPIC_CHARS: usize = 200;
/// pgvector's own `hnsw.ef_search` default.
pub const DEFAULT_MIN_EF_SEARCH: usize = 40;

/// Ranked similarity search over a [`ChunkStore`].
#[derive(Clone)]
pub struct SimilaritySearch {
    store: Arc<dyn ChunkStore>,
    min_ef_search: usize,
}

impl SimilaritySearch {
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self {
            store,
            min_ef_search: DEFAULT_MIN_EF_SEARCH,
        }
    }

    pub fn with_min_ef_search(mut self, min_ef_search: usize) -> Self {
        self.min_ef_search = min_ef_search;
        self
    }

    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Candidate window for a query returning `limit` rows. Never below `limit`.
    pub fn ef_search_for(&self, limit: usize) -> usize {
        limit.max(self.min_ef_search)
    }

    /// Top-`limit` chunks, similarity descending, ties by `chunk_id` ascending.
    ///
    /// The tie-break orders the rows the store returned. It does not choose
    /// between rows tied at the store's own `limit` cutoff.
    pub async fn ranked(&self, vector: Vec<f32>, limit: usize) -> RagResult<Vec<SearchResult>> {
        validate_limit(limit)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = NearestQuery {
            vector,
            limit,
            ef_search: self.ef_search_for(limit),
        };
        let mut results = self.store.nearest(&query).await?;
        rank(&mut results);
        results.truncate(limit);
        Ok(results)
    }
}

pub fn validate_limit(limit: usize) -> RagResult<()> {
    if limit > MAX_SEARCH_LIMIT {
        return Err(RagError::Validation(format!(
            "limit must be at most {MAX_SEARCH_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

pub fn validate_topic(topic: &str) -> RagResult<()> {
    if topic.trim().is_empty() {
        return Err(RagError::Validation("topic must not be empty".to_string()));
    }
    let chars = topic.chars().count();
    if chars > MAX_TOPIC_CHARS {
        return Err(RagError::Validation(format!(
            "topic must be at most {MAX_TOPIC_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

/// NaN (zero-norm vectors under cosine distance) sorts below every real score.
fn rank_key(similarity: f64) -> f64 {
    if similarity.is_nan() {
        f64::NEG_INFINITY
    } else {
        similarity
    }
}

fn rank(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        rank_key(b.similarity)
            .total_cmp(&rank_key(a.similarity))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
}
