//! In-process fakes for the three external collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use kataribe_rag::{
    AliasTable, ChunkStore, Embedder, EngineSettings, GenerationResult, GenerationSettings,
    Generator, NearestQuery, Prompt, RagEngine, RagError, RagResult, SearchResult, StoreStats,
};

/// Returns a fixed vector and counts calls.
#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::ExternalService("embedding endpoint returned 500".to_string()));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// Serves canned rows and records every query it receives.
#[derive(Default)]
pub struct FakeStore {
    pub rows: Vec<SearchResult>,
    pub queries: Mutex<Vec<NearestQuery>>,
    pub fail: bool,
}

impl FakeStore {
    pub fn with_rows(rows: Vec<SearchResult>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<NearestQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChunkStore for FakeStore {
    async fn nearest(&self, query: &NearestQuery) -> RagResult<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(RagError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(self.rows.iter().take(query.limit).cloned().collect())
    }

    async fn stats(&self) -> RagResult<StoreStats> {
        if self.fail {
            return Err(RagError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(StoreStats {
            chunk_count: self.rows.len() as i64,
            dated_chunk_count: self.rows.iter().filter(|r| r.message_date.is_some()).count()
                as i64,
        })
    }
}

/// Replies with fixed text and keeps every prompt it was given.
pub struct FakeGenerator {
    pub reply: Option<String>,
    pub prompts: Mutex<Vec<Prompt>>,
    pub fail: bool,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::silent()
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Prompt {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("generator was never called")
    }
}

#[async_trait::async_trait]
impl Generator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        _settings: Option<&GenerationSettings>,
    ) -> RagResult<GenerationResult> {
        self.prompts.lock().unwrap().push(prompt.clone());
        if self.fail {
            return Err(RagError::Generation(
                "Failed to generate AI response via fake: request timed out".to_string(),
            ));
        }
        Ok(GenerationResult {
            text: self.reply.clone(),
            usage: None,
            model: "fake-model".to_string(),
        })
    }
}

pub fn chunk(id: &str, content: &str, similarity: f64) -> SearchResult {
    SearchResult {
        chunk_id: id.to_string(),
        content: content.to_string(),
        message_date: None,
        similarity,
    }
}

pub fn dated_chunk(
    id: &str,
    content: &str,
    similarity: f64,
    y: i32,
    m: u32,
    d: u32,
) -> SearchResult {
    SearchResult {
        message_date: Some(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
        ..chunk(id, content, similarity)
    }
}

pub struct Harness {
    pub engine: RagEngine,
    pub embedder: Arc<FakeEmbedder>,
    pub store: Arc<FakeStore>,
    pub generator: Arc<FakeGenerator>,
}

pub fn harness(store: FakeStore, generator: FakeGenerator, aliases: AliasTable) -> Harness {
    harness_with(FakeEmbedder::default(), store, generator, aliases)
}

pub fn harness_with(
    embedder: FakeEmbedder,
    store: FakeStore,
    generator: FakeGenerator,
    aliases: AliasTable,
) -> Harness {
    let embedder = Arc::new(embedder);
    let store = Arc::new(store);
    let generator = Arc::new(generator);
    let engine = RagEngine::new(
        embedder.clone(),
        store.clone(),
        generator.clone(),
        aliases,
        EngineSettings::default(),
    );
    Harness {
        engine,
        embedder,
        store,
        generator,
    }
}
