use kataribe_core::EmbeddingSettings;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::errors::{RagError, RagResult};
use crate::providers::openai_compatible::api_url;

/// Turns text into a fixed-dimension vector.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;
}

/// Client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimensions: Option<usize>,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(settings: &EmbeddingSettings, api_key: Option<String>) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            dimensions: settings.dimensions,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn embeddings_url(&self) -> String {
        api_url(&self.base_url, "embeddings")
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn check_dimensions(&self, embedding: &[f32]) -> RagResult<()> {
        match self.dimensions {
            Some(expected) if expected != embedding.len() => {
                Err(RagError::ExternalService(format!(
                    "embedding has {} dimensions, expected {expected}",
                    embedding.len()
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::Validation("cannot embed empty text".to_string()));
        }

        let body = EmbedRequest {
            model: &self.model,
            input: text,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::ExternalService(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::ExternalService(format!(
                "embedding request failed: {status} {text}"
            )));
        }

        let payload: EmbedResponse = response.json().await.map_err(|e| {
            RagError::ExternalService(format!("malformed embedding response: {e}"))
        })?;

        let embedding = payload
            .data
            .into_iter()
            .min_by_key(|entry| entry.index)
            .map(|entry| entry.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| {
                RagError::ExternalService("embedding response missing vectors".to_string())
            })?;

        self.check_dimensions(&embedding)?;
        Ok(embedding)
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
