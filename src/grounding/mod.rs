//! Four-stage grounding of a free-text summary against its source comments.
//!
//! Each stage sends one prompt to the model and hands the returned text to the
//! next stage. The final text is parsed into a [`SummaryDocument`]. Any stage
//! failure aborts the whole run; there is no partially grounded result.

pub mod prompts;
mod trace;

pub use trace::{StageTrace, line_diff};

use crate::annotation::{cited_ids, count_claims, parse_chunks};
use crate::citations::CommentTable;
use crate::error::{GroundingError, Result};
use crate::llm::{LlmError, Model};
use crate::models::Comment;
use crate::summary::SummaryDocument;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    IdentifyClaims,
    AssignGrounding,
    VerifyGrounding,
    FinalizeGrounding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::IdentifyClaims => "identify-claims",
            Stage::AssignGrounding => "assign-grounding",
            Stage::VerifyGrounding => "verify-grounding",
            Stage::FinalizeGrounding => "finalize-grounding",
        };
        write!(f, "{}", name)
    }
}

// A stage paired with the prompt it sends for the previous stage's text
pub struct StageStep {
    pub stage: Stage,
    pub build_prompt: fn(&str, &[Comment]) -> String,
}

// Stages 1 and 4 work on the text alone
fn identify_step(summary: &str, _comments: &[Comment]) -> String {
    prompts::identify_claims(summary)
}

fn finalize_step(summary: &str, _comments: &[Comment]) -> String {
    prompts::finalize_grounding(summary)
}

/// The pipeline, in execution order. Nothing else encodes stage order.
pub const STAGES: [StageStep; 4] = [
    StageStep {
        stage: Stage::IdentifyClaims,
        build_prompt: identify_step,
    },
    StageStep {
        stage: Stage::AssignGrounding,
        build_prompt: prompts::assign_grounding,
    },
    StageStep {
        stage: Stage::VerifyGrounding,
        build_prompt: prompts::verify_grounding,
    },
    StageStep {
        stage: Stage::FinalizeGrounding,
        build_prompt: finalize_step,
    },
];

#[derive(Debug, Clone)]
pub struct GroundedSummary {
    pub run_id: Uuid,
    pub document: SummaryDocument,
    pub trace: Vec<StageTrace>,
}

// Input for one independent grounding run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingJob {
    pub summary: String,
    pub comments: Vec<Comment>,
}

#[derive(Clone)]
pub struct GroundingPipeline {
    model: Arc<dyn Model>,
}

impl GroundingPipeline {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Runs every stage in order and parses the final text.
    pub async fn run(&self, summary: &str, comments: &[Comment]) -> Result<GroundedSummary> {
        let run_id = Uuid::new_v4();
        info!(
            "Grounding run {} started ({} comments, {} chars)",
            run_id,
            comments.len(),
            summary.len()
        );

        let mut text = summary.to_string();
        let mut trace = Vec::with_capacity(STAGES.len());

        for step in &STAGES {
            let output = self.run_stage(step, &text, comments).await?;

            let stage_trace = StageTrace::record(step.stage, &text, &output);
            debug!(
                "Run {} stage {}: {} -> {} claims\n{}",
                run_id,
                step.stage,
                stage_trace.claims_before,
                stage_trace.claims_after,
                stage_trace.diff
            );
            trace.push(stage_trace);

            text = output;
        }

        let document = SummaryDocument::new(parse_chunks(&text), comments.to_vec());
        info!(
            "Grounding run {} finished with {} grounded claim(s)",
            run_id,
            document.claims().count()
        );

        Ok(GroundedSummary {
            run_id,
            document,
            trace,
        })
    }

    async fn run_stage(&self, step: &StageStep, input: &str, comments: &[Comment]) -> Result<String> {
        let prompt = (step.build_prompt)(input, comments);
        debug!("Stage {} prompt is {} chars", step.stage, prompt.len());

        let output = self.model.generate_text(&prompt).await.map_err(|e| {
            warn!("Stage {} failed: {}", step.stage, e);
            GroundingError::Provider(e)
        })?;

        if output.trim().is_empty() {
            return Err(GroundingError::Provider(LlmError::EmptyResponse));
        }

        check_stage_output(step.stage, input, &output, comments);
        Ok(output)
    }
}

// Contract checks on a stage's output. Violations are logged, never fatal.
fn check_stage_output(stage: Stage, input: &str, output: &str, comments: &[Comment]) {
    let claims_in = count_claims(input);
    let claims_out = count_claims(output);
    let ids = cited_ids(output);

    match stage {
        Stage::IdentifyClaims => {
            if claims_out == 0 {
                warn!("{}: no claims were marked", stage);
            }
            if !ids.is_empty() {
                warn!("{}: {} id(s) present before assignment", stage, ids.len());
            }
        }
        Stage::AssignGrounding | Stage::VerifyGrounding => {
            if claims_in != claims_out {
                warn!(
                    "{}: claim count changed from {} to {}",
                    stage, claims_in, claims_out
                );
            }
        }
        Stage::FinalizeGrounding => {
            let empty = parse_chunks(output)
                .iter()
                .filter(|chunk| matches!(&chunk.representative_comment_ids, Some(ids) if ids.is_empty()))
                .count();
            if empty > 0 {
                warn!("{}: {} ungrounded claim(s) left in place", stage, empty);
            }
        }
    }

    let table = CommentTable::new(comments);
    for id in ids.iter().filter(|id| !table.contains(id)) {
        warn!("{}: cites unknown comment id '{}'", stage, id);
    }
}

/// Grounds independent jobs concurrently. Results come back in job order and
/// each job succeeds or fails on its own.
pub async fn ground_many(
    pipeline: &GroundingPipeline,
    jobs: Vec<GroundingJob>,
) -> Vec<Result<GroundedSummary>> {
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.run(&job.summary, &job.comments).await })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(GroundingError::Task(e.to_string())),
        });
    }
    results
}
