use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ranked chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub content: String,
    pub message_date: Option<DateTime<Utc>>,
    /// `1 - cosine_distance`
    pub similarity: f64,
}

/// A nearest-neighbour query as handed to a [`crate::store::ChunkStore`].
///
/// `ef_search` is applied to the same connection and transaction as the
/// ranked select and is always at least `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestQuery {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub ef_search: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub chunk_count: i64,
    pub dated_chunk_count: i64,
}

/// Assembled prompt sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system_instructions: String,
    pub user_query: String,
}

/// Per-call overrides for the generation backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<GenerationUsage>,
    pub model: String,
}

/// Post content ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub user_id: String,
    pub topic: String,
    pub content: String,
}
