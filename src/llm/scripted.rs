use super::{LlmError, Model};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays canned responses in order. Useful for exercising the pipeline
/// without a provider; running out of responses is an API error.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(responses: Vec<S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    // Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Api("scripted model lock poisoned".to_string()))?;
        responses
            .pop_front()
            .ok_or_else(|| LlmError::Api("no scripted responses left".to_string()))
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.next(prompt)
    }

    async fn generate_data(
        &self,
        prompt: &str,
        _schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let raw = self.next(prompt)?;
        serde_json::from_str(&raw).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}
