//! Retrieval, anonymization and summarization over an embedded chat corpus.

pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod messages;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod sanitize;
pub mod search;
pub mod store;

pub use embeddings::{Embedder, EmbeddingClient};
pub use engine::{EngineSettings, RagEngine};
pub use errors::{RagError, RagResult};
pub use models::{
    GenerationResult, GenerationSettings, GenerationUsage, NearestQuery, PostDraft, Prompt,
    SearchResult, StoreStats,
};
pub use providers::{Generator, OpenAiCompatibleClient};
pub use sanitize::{AliasTable, sanitize, sanitize_results};
pub use search::{MAX_SEARCH_LIMIT, MAX_TOPIC_CHARS, SimilaritySearch};
pub use store::{ChunkStore, PgChunkStore};
