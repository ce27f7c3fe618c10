//! Model capability used by the grounding pipeline.
//!
//! The pipeline only ever sees `dyn Model`; concrete providers and the retry
//! policy plug in behind it.

mod openai;
mod retry;
mod scripted;

pub use openai::OpenAiModel;
pub use retry::RetryingModel;
pub use scripted::ScriptedModel;

use crate::error::{GroundingError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait Model: Send + Sync {
    /// Free-text completion for a prompt.
    async fn generate_text(&self, prompt: &str) -> std::result::Result<String, LlmError>;

    /// Structured completion constrained by a JSON schema.
    async fn generate_data(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    // Worth another attempt with the same prompt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. } | LlmError::Network(_) | LlmError::EmptyResponse
        )
    }
}

/// Structured call deserialized into `T`; a response that does not fit `T`
/// is a schema mismatch rather than a provider failure.
pub async fn generate_typed<T: DeserializeOwned>(
    model: &dyn Model,
    prompt: &str,
    schema: &serde_json::Value,
) -> Result<T> {
    let value = model.generate_data(prompt, schema).await?;
    serde_json::from_value(value).map_err(|e| GroundingError::SchemaMismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Topic {
        name: String,
    }

    #[tokio::test]
    async fn typed_generation_parses_matching_data() {
        let model = ScriptedModel::new(vec![r#"{"name": "Transit"}"#]);
        let topic: Topic = generate_typed(&model, "p", &json!({"type": "object"}))
            .await
            .unwrap();
        assert_eq!(topic.name, "Transit");
    }

    #[tokio::test]
    async fn typed_generation_reports_schema_mismatch() {
        let model = ScriptedModel::new(vec![r#"{"title": "Transit"}"#]);
        let result: Result<Topic> = generate_typed(&model, "p", &json!({"type": "object"})).await;
        assert!(matches!(result, Err(GroundingError::SchemaMismatch(_))));
    }

    #[test]
    fn transient_errors() {
        assert!(LlmError::RateLimited { retry_after_ms: 10 }.is_transient());
        assert!(LlmError::EmptyResponse.is_transient());
        assert!(!LlmError::Api("bad key".into()).is_transient());
    }
}
