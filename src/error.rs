use crate::llm::LlmError;

pub type Result<T> = std::result::Result<T, GroundingError>;

#[derive(Debug, thiserror::Error)]
pub enum GroundingError {
    // The model layer gave up after exhausting its retries
    #[error("model provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("structured response did not match schema: {0}")]
    SchemaMismatch(String),

    #[error("cannot cite unknown comment id '{id}'")]
    UnknownCitation { id: String },

    #[error("unsupported render format '{0}'")]
    UnsupportedFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("grounding task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
