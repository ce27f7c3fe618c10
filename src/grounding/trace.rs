use super::Stage;
use crate::annotation::count_claims;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MAX_LINE_PREVIEW: usize = 120;
const MAX_HUNK_LINES: usize = 40;

// What one stage did to the text. Informational only.
#[derive(Debug, Clone, Serialize)]
pub struct StageTrace {
    pub stage: Stage,
    pub completed_at: DateTime<Utc>,
    pub claims_before: usize,
    pub claims_after: usize,
    pub diff: String,
}

impl StageTrace {
    pub fn record(stage: Stage, before: &str, after: &str) -> Self {
        Self {
            stage,
            completed_at: Utc::now(),
            claims_before: count_claims(before),
            claims_after: count_claims(after),
            diff: line_diff(before, after),
        }
    }
}

/// Compact line diff: the common leading and trailing lines are trimmed and
/// the changed middle is listed as removed ("- ") then added ("+ ") lines.
/// Runs in linear time; long hunks are cut off after `MAX_HUNK_LINES`.
pub fn line_diff(before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();

    let prefix = old
        .iter()
        .zip(&new)
        .take_while(|(a, b)| a == b)
        .count();

    // The suffix may not reach back into the prefix of either side
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let removed = &old[prefix..old.len() - suffix];
    let added = &new[prefix..new.len() - suffix];

    let mut out = Vec::new();
    push_hunk(&mut out, "-", removed);
    push_hunk(&mut out, "+", added);
    out.join("\n")
}

fn push_hunk(out: &mut Vec<String>, sign: &str, lines: &[&str]) {
    for line in lines.iter().take(MAX_HUNK_LINES) {
        out.push(format!("{} {}", sign, preview(line)));
    }
    if lines.len() > MAX_HUNK_LINES {
        out.push(format!("{} ... {} more line(s)", sign, lines.len() - MAX_HUNK_LINES));
    }
}

fn preview(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_PREVIEW {
        return line.to_string();
    }
    let clipped: String = line.chars().take(MAX_LINE_PREVIEW).collect();
    format!("{}...", clipped)
}
