pub mod annotation;
pub mod citations;
pub mod config;
pub mod error;
pub mod grounding;
pub mod llm;
pub mod models;
pub mod summary;
pub mod voting;

pub use citations::Format;
pub use error::{GroundingError, Result};
pub use grounding::{GroundedSummary, GroundingJob, GroundingPipeline, ground_many};
pub use llm::{Model, RetryingModel, ScriptedModel};
pub use models::{Chunk, Comment, VoteTally};
pub use summary::SummaryDocument;
