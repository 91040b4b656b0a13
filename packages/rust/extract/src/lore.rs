//! Biography extraction.
//!
//! Narrative lore lives in a quotation block with no `id` or `class` whose
//! final paragraph is the biography marker. Attributed quotation blocks are
//! navigation chrome and never considered.

use crate::document::Document;
use crate::selectors::{PARAGRAPH, QUOTE};

/// Trailing paragraph text identifying the biography block.
pub const BIOGRAPHY_MARKER: &str = "— Biography";

/// Result of looking for lore on a page. Only [`LoreOutcome::Found`] carries text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoreOutcome {
    Found(String),
    /// No quotation block without attributes exists.
    NoCandidateBlocks,
    /// Candidate blocks exist but none ends with the marker.
    MarkerMissing,
    /// The marked block has no text before the marker.
    Empty,
}

impl LoreOutcome {
    pub fn into_lore(self) -> Option<String> {
        match self {
            Self::Found(text) => Some(text),
            _ => None,
        }
    }

    /// Short reason for logging a missing biography.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NoCandidateBlocks => "no unattributed quotation block",
            Self::MarkerMissing => "biography marker not found",
            Self::Empty => "biography block is empty",
        }
    }
}

/// Find and normalize the biography text.
pub fn extract_lore(doc: &Document) -> LoreOutcome {
    let candidates: Vec<_> = doc
        .select(&QUOTE)
        .into_iter()
        .filter(|block| !block.has_identity())
        .collect();

    if candidates.is_empty() {
        return LoreOutcome::NoCandidateBlocks;
    }

    let marked = candidates.iter().find_map(|block| {
        let paragraphs = block.select(&PARAGRAPH);
        match paragraphs.split_last() {
            Some((last, body)) if last.text() == BIOGRAPHY_MARKER => Some(body.to_vec()),
            _ => None,
        }
    });

    let Some(body) = marked else {
        return LoreOutcome::MarkerMissing;
    };

    let text = body
        .iter()
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string();

    if text.is_empty() {
        LoreOutcome::Empty
    } else {
        LoreOutcome::Found(text)
    }
}
