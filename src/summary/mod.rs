use crate::annotation::{format_claim, parse_chunks};
use crate::citations::{CommentTable, Format};
use crate::error::Result;
use crate::models::{Chunk, Comment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A grounded summary: ordered chunks plus the comments they cite.
/// Built once at the end of a grounding run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    chunks: Vec<Chunk>,
    source_comments: Vec<Comment>,
}

impl SummaryDocument {
    pub fn new(chunks: Vec<Chunk>, source_comments: Vec<Comment>) -> Self {
        Self {
            chunks,
            source_comments,
        }
    }

    /// Parses annotated text into a document over `comments`.
    pub fn parse(annotated: &str, comments: &[Comment]) -> Self {
        Self::new(parse_chunks(annotated), comments.to_vec())
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn source_comments(&self) -> &[Comment] {
        &self.source_comments
    }

    pub fn claims(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().filter(|chunk| chunk.is_claim())
    }

    // Distinct ids in order of first citation
    pub fn cited_comment_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.claims()
            .flat_map(|chunk| chunk.representative_comment_ids.iter().flatten())
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Renders the document with citation links in the given format.
    /// Fails if any chunk cites an id missing from the source comments.
    pub fn render(&self, format: Format) -> Result<String> {
        let table = CommentTable::new(&self.source_comments);
        self.render_with(|ids| table.cite(ids, format))
    }

    /// Renders with a caller-supplied citation formatter. The formatter is only
    /// invoked for claim chunks with at least one id.
    pub fn render_with<F>(&self, mut cite: F) -> Result<String>
    where
        F: FnMut(&[String]) -> Result<String>,
    {
        let mut out = String::new();
        for chunk in &self.chunks {
            out.push_str(&chunk.text);
            match &chunk.representative_comment_ids {
                Some(ids) if !ids.is_empty() => out.push_str(&cite(ids)?),
                _ => {}
            }
        }
        Ok(out)
    }

    /// Serializes the chunks back into claim-marker form.
    ///
    /// Filler and claim text come back byte for byte. Id lists are normalized:
    /// ids are re-joined with a bare comma, so `^[1, 2]` is written `^[1,2]`.
    pub fn to_annotated(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| match &chunk.representative_comment_ids {
                Some(ids) => format_claim(&chunk.text, ids),
                None => chunk.text.clone(),
            })
            .collect()
    }

    // Text with all citations dropped
    pub fn plain_text(&self) -> String {
        self.chunks.iter().map(|chunk| chunk.text.as_str()).collect()
    }
}
