use super::{LlmError, Model};
use crate::config::Config;
use crate::error::{GroundingError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiModel {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GroundingError::Config("LLM_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GroundingError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn chat(&self, body: serde_json::Value) -> std::result::Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LlmError::RateLimited {
                retry_after_ms: retry_after * 1000,
            });
        }
        if status.is_server_error() {
            return Err(LlmError::Network(format!("server returned {}", status)));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{}: {}", status, error_text)));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        match data["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            Some(_) => Err(LlmError::EmptyResponse),
            None => Err(LlmError::InvalidResponse(
                "response has no message content".to_string(),
            )),
        }
    }

    fn messages(prompt: &str) -> serde_json::Value {
        json!([{ "role": "user", "content": prompt }])
    }
}

#[async_trait]
impl Model for OpenAiModel {
    async fn generate_text(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        self.chat(json!({
            "model": self.model,
            "messages": Self::messages(prompt),
        }))
        .await
    }

    async fn generate_data(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, LlmError> {
        let content = self
            .chat(json!({
                "model": self.model,
                "messages": Self::messages(prompt),
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "response", "schema": schema, "strict": true },
                },
            }))
            .await?;

        serde_json::from_str(&content).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_an_api_key() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        assert!(matches!(
            OpenAiModel::from_config(&config),
            Err(GroundingError::Config(_))
        ));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let config = Config {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Config::default()
        };
        let model = OpenAiModel::from_config(&config).unwrap();
        assert_eq!(model.base_url, "http://localhost:8080/v1");
    }
}
