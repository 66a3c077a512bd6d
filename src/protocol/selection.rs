//! Completion-accepted telemetry.
//!
//! [`SelectionRequest::from_context`] turns editor offsets and the candidate
//! list into the counters the engine expects in a `Selection` state update.
//! No I/O happens here.

use serde::{Deserialize, Serialize};

use super::responses::{CompletionCandidate, Origin};
use crate::{Error, Result};

/// Character offsets of the line holding the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBounds {
    pub begin: usize,
    pub end: usize,
}

impl LineBounds {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// What the editor knows at the moment a completion is accepted.
///
/// Offsets are character positions in the buffer, taken after the
/// substitution has been inserted.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub file_name: &'a str,
    /// Cursor position after insertion.
    pub current_location: usize,
    /// Start of the replaced prefix.
    pub before_prefix_location: usize,
    pub current_line: LineBounds,
    /// Text that was inserted.
    pub substitution: &'a str,
    pub selected: &'a CompletionCandidate,
    pub completions: &'a [CompletionCandidate],
}

/// Per-candidate summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSummary {
    pub length: usize,
    pub strength: String,
    pub origin: String,
}

/// `Selection` state payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub language: String,
    pub length: i64,
    pub net_length: i64,
    pub strength: String,
    pub origin: String,
    pub index: usize,
    pub line_prefix_length: i64,
    pub line_net_prefix_length: i64,
    pub line_suffix_length: i64,
    pub num_of_suggestions: usize,
    pub num_of_vanilla_suggestions: usize,
    pub num_of_deep_local_suggestions: usize,
    pub num_of_deep_cloud_suggestions: usize,
    pub num_of_lsp_suggestions: usize,
    pub suggestions: Vec<SuggestionSummary>,
}

impl SelectionRequest {
    /// Compute the telemetry for an accepted completion.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if `selected` is not among `completions`.
    pub fn from_context(ctx: &SelectionContext<'_>) -> Result<Self> {
        let index = ctx
            .completions
            .iter()
            .position(|c| c == ctx.selected)
            .ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "selected completion {:?} is not in the candidate list",
                    ctx.selected.new_prefix
                ))
            })?;

        let current = ctx.current_location as i64;
        let length = current - ctx.before_prefix_location as i64;
        let net_length = ctx.substitution.chars().count() as i64;
        let line_prefix_length = (current - net_length) - ctx.current_line.begin as i64;

        let count = |origin: Origin| {
            ctx.completions
                .iter()
                .filter(|c| c.origin.as_ref() == Some(&origin))
                .count()
        };

        Ok(Self {
            language: language_of(ctx.file_name).to_string(),
            length,
            net_length,
            strength: ctx.selected.strength().to_string(),
            origin: ctx.selected.origin_label().to_string(),
            index,
            line_prefix_length,
            line_net_prefix_length: line_prefix_length - (length - net_length),
            line_suffix_length: ctx.current_line.end as i64 - current,
            num_of_suggestions: ctx.completions.len(),
            num_of_vanilla_suggestions: count(Origin::Vanilla),
            num_of_deep_local_suggestions: count(Origin::Local),
            num_of_deep_cloud_suggestions: count(Origin::Cloud),
            num_of_lsp_suggestions: count(Origin::Lsp),
            suggestions: ctx
                .completions
                .iter()
                .map(|c| SuggestionSummary {
                    length: c.new_prefix.chars().count(),
                    strength: c.strength().to_string(),
                    origin: c.origin_label().to_string(),
                })
                .collect(),
        })
    }
}

/// Text after the last `.`, or the whole name when there is none.
fn language_of(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}
