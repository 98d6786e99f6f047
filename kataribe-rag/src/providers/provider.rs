//! Generator trait abstracting text-generation backends.

use crate::errors::RagResult;
use crate::models::{GenerationResult, GenerationSettings, Prompt};

/// A text-generation backend.
///
/// Implementations keep no state between calls; each `generate` is one
/// outbound request.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Default model
    fn model(&self) -> &str;

    /// Send the system block and user query, returning the completion text.
    async fn generate(
        &self,
        prompt: &Prompt,
        settings: Option<&GenerationSettings>,
    ) -> RagResult<GenerationResult>;
}

/// `Some(text)` only when the completion holds something besides whitespace.
pub fn non_blank_text(result: &GenerationResult) -> Option<&str> {
    result
        .text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: Option<&str>) -> GenerationResult {
        GenerationResult {
            text: text.map(str::to_string),
            usage: None,
            model: "test-model".to_string(),
        }
    }

    #[test]
    fn test_non_blank_text() {
        assert_eq!(non_blank_text(&result(Some("要約"))), Some("要約"));
        assert_eq!(non_blank_text(&result(Some(" \n"))), None);
        assert_eq!(non_blank_text(&result(Some(""))), None);
        assert_eq!(non_blank_text(&result(None)), None);
    }
}
