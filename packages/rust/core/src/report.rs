//! Aggregation and the Markdown summary report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use triage_shared::{Category, DisposalReason, IssueId, Outcome};

/// One input document and what happened to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriagedDocument {
    pub path: PathBuf,
    pub id: IssueId,
    pub title: String,
    /// SHA-256 of the file content as read.
    pub content_hash: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Outcome tallies for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageCounts {
    pub total: usize,
    pub kept: BTreeMap<Category, usize>,
    pub deleted: BTreeMap<DisposalReason, usize>,
}

impl TriageCounts {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Keep { category, .. } => *self.kept.entry(*category).or_default() += 1,
            Outcome::Delete { reason } => *self.deleted.entry(*reason).or_default() += 1,
        }
    }

    pub fn kept_total(&self) -> usize {
        self.kept.values().sum()
    }

    pub fn deleted_total(&self) -> usize {
        self.deleted.values().sum()
    }

    pub fn kept_in(&self, category: Category) -> usize {
        self.kept.get(&category).copied().unwrap_or(0)
    }

    pub fn deleted_for(&self, reason: DisposalReason) -> usize {
        self.deleted.get(&reason).copied().unwrap_or(0)
    }
}

impl FromIterator<Outcome> for TriageCounts {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut counts = Self::default();
        for outcome in iter {
            counts.record(&outcome);
        }
        counts
    }
}

/// Render the summary report.
///
/// Kept documents are grouped by category in declaration order and keep
/// their input order within a group. Empty categories are omitted.
pub fn render_report(project_name: &str, documents: &[TriagedDocument]) -> String {
    let counts: TriageCounts = documents.iter().map(|d| d.outcome.clone()).collect();

    let mut lines = vec![
        format!("# {project_name} Open Issues Summary\n"),
        format!("**Total issues reviewed:** {}", counts.total),
        format!("**Kept:** {}", counts.kept_total()),
        format!(
            "**Deleted:** {} ({} duplicates, {} irrelevant, {} useless)\n",
            counts.deleted_total(),
            counts.deleted_for(DisposalReason::Duplicate),
            counts.deleted_for(DisposalReason::Irrelevant),
            counts.deleted_for(DisposalReason::Useless),
        ),
    ];

    for category in Category::ALL {
        let entries: Vec<_> = documents
            .iter()
            .filter_map(|d| match &d.outcome {
                Outcome::Keep {
                    category: c,
                    summary,
                } if *c == category => Some((d, summary)),
                _ => None,
            })
            .collect();

        if entries.is_empty() {
            continue;
        }

        lines.push(format!("## {} ({})", category.title(), entries.len()));
        for (doc, summary) in entries {
            let summary = summary.replace('\n', " ");
            lines.push(format!("- #{}: {} — {}", doc.id, doc.title, summary));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
