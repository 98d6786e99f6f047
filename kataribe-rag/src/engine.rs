//! Retrieval-augmented summarization pipeline.
//!
//! `search -> sanitize -> assemble -> generate`. The engine owns only shared
//! handles and an immutable alias table, so clones are cheap and every call
//! is independent of the others.

use std::sync::Arc;

use kataribe_core::Config;

use crate::embeddings::{Embedder, EmbeddingClient};
use crate::errors::RagResult;
use crate::messages;
use crate::models::{GenerationSettings, PostDraft, SearchResult, StoreStats};
use crate::prompt;
use crate::providers::{Generator, OpenAiCompatibleClient, non_blank_text};
use crate::sanitize::{AliasTable, sanitize_results};
use crate::search::{DEFAULT_MIN_EF_SEARCH, SimilaritySearch, validate_limit, validate_topic};
use crate::store::{ChunkStore, PgChunkStore};

/// Tuning that is fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Floor for the store's candidate window.
    pub min_ef_search: usize,
    /// Per-call overrides forwarded to the generator.
    pub generation: Option<GenerationSettings>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_ef_search: DEFAULT_MIN_EF_SEARCH,
            generation: None,
        }
    }
}

enum Outcome {
    NoResults,
    Empty,
    Generated(String),
}

#[derive(Clone)]
pub struct RagEngine {
    embedder: Arc<dyn Embedder>,
    search: SimilaritySearch,
    generator: Arc<dyn Generator>,
    aliases: Arc<AliasTable>,
    settings: EngineSettings,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn ChunkStore>,
        generator: Arc<dyn Generator>,
        aliases: AliasTable,
        settings: EngineSettings,
    ) -> Self {
        let search = SimilaritySearch::new(store).with_min_ef_search(settings.min_ef_search);
        Self {
            embedder,
            search,
            generator,
            aliases: Arc::new(aliases),
            settings,
        }
    }

    /// Build the engine with the real adapters named in `config`.
    pub async fn open(config: &Config) -> RagResult<Self> {
        let api_key = Some(config.openai_api_key().to_string());
        let embedder = EmbeddingClient::new(&config.settings.embedding, api_key.clone());
        let store = PgChunkStore::connect(config.database_url(), &config.settings.store).await?;
        let generator = OpenAiCompatibleClient::from_settings(
            &config.settings.generation,
            api_key,
            config.generation_model(),
        )?;
        let aliases = AliasTable::from(config.aliases());

        tracing::info!(
            embedding_model = embedder.model(),
            generation_model = generator.model(),
            table = %config.settings.store.table,
            alias_count = aliases.len(),
            "RAG engine ready"
        );

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(store),
            Arc::new(generator),
            aliases,
            EngineSettings {
                min_ef_search: config.settings.store.min_ef_search,
                generation: None,
            },
        ))
    }

    /// Up to `limit` chunks most similar to `topic`, most similar first.
    pub async fn search(&self, topic: &str, limit: usize) -> RagResult<Vec<SearchResult>> {
        validate_topic(topic)?;
        validate_limit(limit)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(topic).await?;
        let results = self.search.ranked(vector, limit).await?;
        tracing::debug!(
            limit,
            ef_search = self.search.ef_search_for(limit),
            results = results.len(),
            "similarity search complete"
        );
        Ok(results)
    }

    /// Search for `topic` and summarize what was found.
    ///
    /// Finding nothing or getting blank text back are not errors; both
    /// return a fixed Japanese message instead.
    pub async fn summarize(&self, topic: &str, limit: usize) -> RagResult<String> {
        let results = self.search(topic, limit).await?;
        self.summarize_results(topic, &results).await
    }

    /// Summarize results the caller already fetched.
    pub async fn summarize_results(
        &self,
        topic: &str,
        results: &[SearchResult],
    ) -> RagResult<String> {
        Ok(match self.generate_summary(topic, results).await? {
            Outcome::NoResults => messages::no_information_found(topic),
            Outcome::Empty => messages::EMPTY_SUMMARY.to_string(),
            Outcome::Generated(text) => text,
        })
    }

    /// Post content for `user_id`: the summary under a topic heading, or the
    /// bare not-found message when the search came back empty.
    pub async fn draft_post(
        &self,
        user_id: &str,
        topic: &str,
        limit: usize,
    ) -> RagResult<PostDraft> {
        let results = self.search(topic, limit).await?;
        let content = match self.generate_summary(topic, &results).await? {
            Outcome::NoResults => messages::no_information_found(topic),
            Outcome::Empty => messages::post_content(topic, messages::EMPTY_SUMMARY),
            Outcome::Generated(text) => messages::post_content(topic, &text),
        };
        Ok(PostDraft {
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            content,
        })
    }

    pub async fn stats(&self) -> RagResult<StoreStats> {
        self.search.store().stats().await
    }

    async fn generate_summary(&self, topic: &str, results: &[SearchResult]) -> RagResult<Outcome> {
        if results.is_empty() {
            tracing::warn!("no context found for topic, skipping generation");
            return Ok(Outcome::NoResults);
        }

        let sanitized = sanitize_results(results, &self.aliases);
        let prompt = prompt::assemble(topic, &sanitized);
        let generated = self
            .generator
            .generate(&prompt, self.settings.generation.as_ref())
            .await?;

        match non_blank_text(&generated) {
            Some(text) => Ok(Outcome::Generated(text.to_string())),
            None => {
                tracing::warn!(
                    provider = self.generator.name(),
                    model = %generated.model,
                    "generation returned empty text"
                );
                Ok(Outcome::Empty)
            }
        }
    }
}
