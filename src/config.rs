use crate::error::{GroundingError, Result};
use crate::llm::{OpenAiModel, RetryingModel};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            max_attempts: 3,
            retry_delay_secs: 10,
        }
    }
}

impl Config {
    /// Reads settings from the environment; call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // LLM_API_KEY wins, OPENAI_API_KEY is accepted for convenience
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Self {
            api_key,
            model: env::var("LLM_MODEL").unwrap_or(defaults.model),
            base_url: env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_attempts: parse_var("LLM_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_delay_secs: parse_var("LLM_RETRY_DELAY_SECS", defaults.retry_delay_secs)?,
        })
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// The HTTP provider wrapped in the configured retry policy.
    pub fn build_model(&self) -> Result<RetryingModel<OpenAiModel>> {
        Ok(RetryingModel::new(OpenAiModel::from_config(self)?)
            .max_attempts(self.max_attempts)
            .delay(self.retry_delay()))
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| GroundingError::Config(format!("{} has invalid value '{}'", name, raw)))
}
