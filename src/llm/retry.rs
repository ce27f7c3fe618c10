use super::{LlmError, Model};
use async_trait::async_trait;
use log::{error, warn};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Wraps a model with bounded retries and a fixed pause between attempts.
/// Only transient failures are retried; the last error is returned once the
/// attempts run out.
pub struct RetryingModel<M> {
    inner: M,
    max_attempts: u32,
    delay: Duration,
}

impl<M: Model> RetryingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    async fn with_retries<T, F, Fut>(&self, mut call: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "Model call failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, self.max_attempts, e, self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Model call failed after {} attempt(s): {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl<M: Model> Model for RetryingModel<M> {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.with_retries(move || async move {
            let text = self.inner.generate_text(prompt).await?;
            if text.trim().is_empty() {
                return Err(LlmError::EmptyResponse);
            }
            Ok(text)
        })
        .await
    }

    async fn generate_data(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        self.with_retries(move || self.inner.generate_data(prompt, schema))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;

    fn fast(model: ScriptedModel, attempts: u32) -> RetryingModel<ScriptedModel> {
        RetryingModel::new(model)
            .max_attempts(attempts)
            .delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn retries_empty_responses() {
        let model = fast(ScriptedModel::new(vec!["", "  \n", "finally"]), 3);
        assert_eq!(model.generate_text("p").await.unwrap(), "finally");
        assert_eq!(model.inner().call_count(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let model = fast(ScriptedModel::new(vec!["", "", "", "late"]), 3);
        assert!(matches!(
            model.generate_text("p").await,
            Err(LlmError::EmptyResponse)
        ));
        assert_eq!(model.inner().call_count(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        // An empty script fails with a non-transient API error
        let model = fast(ScriptedModel::new(Vec::<String>::new()), 5);
        assert!(matches!(model.generate_text("p").await, Err(LlmError::Api(_))));
        assert_eq!(model.inner().call_count(), 1);
    }
}
