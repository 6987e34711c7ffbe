//! Disposal filter: decides whether a document is deleted instead of reported.
//!
//! Predicates run in the configured order and the first match wins. The
//! decision depends only on the document itself; duplicates are recognized
//! by an explicit marker phrase, never by comparing documents.

use tracing::trace;

use triage_shared::{DisposalReason, FilterConfig, IssueDocument};

/// Compiled disposal rules.
#[derive(Debug, Clone)]
pub struct DisposalFilter {
    order: Vec<DisposalReason>,
    min_description_chars: usize,
    duplicate_markers: Vec<String>,
    noise_markers: Vec<String>,
    irrelevant_markers: Vec<String>,
}

impl DisposalFilter {
    /// Build a filter from config. Markers are matched case-insensitively.
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            order: config.order.clone(),
            min_description_chars: config.min_description_chars,
            duplicate_markers: lowercase_all(&config.duplicate_markers),
            noise_markers: lowercase_all(&config.noise_markers),
            irrelevant_markers: lowercase_all(&config.irrelevant_markers),
        }
    }

    /// Return the disposal reason for `doc`, or `None` if it should be kept.
    pub fn check(&self, doc: &IssueDocument) -> Option<DisposalReason> {
        let lower_content = doc.content.to_lowercase();

        let reason = self
            .order
            .iter()
            .copied()
            .find(|reason| self.matches(*reason, doc, &lower_content));

        if let Some(reason) = reason {
            trace!(path = %doc.path.display(), %reason, "document disposable");
        }
        reason
    }

    fn matches(&self, reason: DisposalReason, doc: &IssueDocument, lower_content: &str) -> bool {
        match reason {
            DisposalReason::Duplicate => contains_any(lower_content, &self.duplicate_markers),
            DisposalReason::Useless => {
                doc.description.is_empty()
                    || non_whitespace_chars(&doc.description) < self.min_description_chars
                    || contains_any(lower_content, &self.noise_markers)
            }
            DisposalReason::Irrelevant => contains_any(lower_content, &self.irrelevant_markers),
        }
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

fn non_whitespace_chars(s: &str) -> usize {
    s.chars().filter(|c| !c.is_whitespace()).count()
}
