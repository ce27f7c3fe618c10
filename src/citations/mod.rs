use crate::error::{GroundingError, Result};
use crate::models::Comment;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Html,
}

impl FromStr for Format {
    type Err = GroundingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Format::Markdown),
            "html" => Ok(Format::Html),
            _ => Err(GroundingError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Markdown => write!(f, "markdown"),
            Format::Html => write!(f, "html"),
        }
    }
}

// Per-group vote line, e.g. "group-0(Agree=3, Disagree=1, Pass=0) group-1(...)"
pub fn vote_tally_summary(comment: &Comment) -> String {
    match &comment.vote_tallies_by_group {
        Some(groups) => groups
            .iter()
            .map(|(group_id, tally)| {
                format!(
                    "group-{}(Agree={}, Disagree={}, Pass={})",
                    group_id,
                    tally.agree_count,
                    tally.disagree_count,
                    tally.pass_count_or_zero()
                )
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => String::new(),
    }
}

// \r\n, \r and \n all become a single space
fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

// Backslash first, so the escapes added for quotes are not doubled
fn escape_markdown_title(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// Ampersand first, so the entities added for the others are not re-escaped
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Hover/alt text for a citation: the comment text with newlines flattened,
/// followed by the vote breakdown when there is one, escaped for `format`.
pub fn citation_hover_text(comment: &Comment, format: Format) -> String {
    let text = flatten_newlines(&comment.text);
    let hover = match comment.vote_tallies_by_group {
        Some(_) => format!("{}\nvotes: {}", text, vote_tally_summary(comment)),
        None => text,
    };
    match format {
        Format::Markdown => escape_markdown_title(&hover),
        Format::Html => escape_html(&hover),
    }
}

pub fn comment_citation(comment: &Comment, format: Format) -> String {
    let hover = citation_hover_text(comment, format);
    match format {
        Format::Markdown => format!("[{}](## \"{}\")", comment.id, hover),
        Format::Html => format!(
            "<a href=\"##\" title=\"{}\">{}</a>",
            hover,
            escape_html(&comment.id)
        ),
    }
}

pub fn comment_citations(comments: &[&Comment], format: Format) -> String {
    let tokens: Vec<String> = comments
        .iter()
        .map(|comment| comment_citation(comment, format))
        .collect();
    format!("[{}]", tokens.join(", "))
}

/// Lookup table from comment id to comment, borrowed from the caller's list.
pub struct CommentTable<'a> {
    by_id: HashMap<&'a str, &'a Comment>,
}

impl<'a> CommentTable<'a> {
    pub fn new(comments: &'a [Comment]) -> Self {
        let by_id = comments
            .iter()
            .map(|comment| (comment.id.as_str(), comment))
            .collect();
        Self { by_id }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&'a Comment> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| GroundingError::UnknownCitation { id: id.to_string() })
    }

    // Resolve every id or fail on the first one missing from the table
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<&'a Comment>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    pub fn cite(&self, ids: &[String], format: Format) -> Result<String> {
        Ok(comment_citations(&self.resolve(ids)?, format))
    }
}
