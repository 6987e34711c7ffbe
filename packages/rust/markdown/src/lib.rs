//! Issue document parsing and one-line summaries.
//!
//! [`parse_issue`] turns an export file into an [`IssueDocument`];
//! [`summarize`] reduces a Markdown description to a single report line by
//! running the stripping passes in `cleanup` and picking the first
//! substantial sentence.

mod cleanup;
mod document;

use std::path::Path;

use tracing::instrument;

use triage_shared::{IssueDocument, Result, SummaryConfig, TriageError};

pub use document::{UNKNOWN_TITLE, parse_issue};

/// Suffix appended to truncated summaries.
const ELLIPSIS: &str = "...";

/// Read and parse one issue file.
///
/// I/O failures are errors; a badly structured file is not.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_issue(path: &Path) -> Result<IssueDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            TriageError::parse(format!("{} is not valid UTF-8", path.display()))
        } else {
            TriageError::io(path, e)
        }
    })?;

    Ok(parse_issue(path, content))
}

/// Produce a one-line synopsis of a description.
///
/// Never fails: empty input yields `empty_placeholder`, input with no
/// qualifying sentence (e.g. only a code block) yields `fallback_placeholder`.
pub fn summarize(description: &str, opts: &SummaryConfig) -> String {
    if description.is_empty() {
        return opts.empty_placeholder.clone();
    }

    let cleaned = cleanup::run_pipeline(description);

    cleanup::split_sentences(cleaned.trim())
        .into_iter()
        .map(str::trim)
        .find(|unit| unit.chars().count() > opts.min_sentence_chars)
        .map(|unit| shorten(&collapse_whitespace(unit), opts.max_chars))
        .unwrap_or_else(|| opts.fallback_placeholder.clone())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max_chars` characters, ellipsis included.
fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = s.chars().take(keep).collect();
    format!("{head}{ELLIPSIS}")
}
