//! Core domain types for issue triage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Topical label assigned to a kept issue.
///
/// Declaration order is significant: it is the report's section order and
/// the tie-break order when two categories score the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Bug,
    Optimization,
    Feature,
    Performance,
    SpecCompliance,
    Api,
    Meta,
    TestCi,
    Docs,
    KnownLimitation,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 10] = [
        Self::Bug,
        Self::Optimization,
        Self::Feature,
        Self::Performance,
        Self::SpecCompliance,
        Self::Api,
        Self::Meta,
        Self::TestCi,
        Self::Docs,
        Self::KnownLimitation,
    ];

    /// Category used when no keyword matches at all.
    pub const FALLBACK: Category = Self::Feature;

    /// Stable identifier, as used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Optimization => "optimization",
            Self::Feature => "feature",
            Self::Performance => "performance",
            Self::SpecCompliance => "spec-compliance",
            Self::Api => "api",
            Self::Meta => "meta",
            Self::TestCi => "test-ci",
            Self::Docs => "docs",
            Self::KnownLimitation => "known-limitation",
        }
    }

    /// Section heading used in the summary report.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Bug => "Bugs",
            Self::Optimization => "Optimization Opportunities",
            Self::Feature => "Feature Requests",
            Self::Performance => "Performance",
            Self::SpecCompliance => "Spec Compliance",
            Self::Api => "API Issues",
            Self::Meta => "Meta / Tracking",
            Self::TestCi => "Test / CI",
            Self::Docs => "Documentation",
            Self::KnownLimitation => "Known Limitations",
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// DisposalReason
// ---------------------------------------------------------------------------

/// Why a document is removed instead of reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposalReason {
    Duplicate,
    Irrelevant,
    Useless,
}

impl DisposalReason {
    /// All reasons, in report order.
    pub const ALL: [DisposalReason; 3] = [Self::Duplicate, Self::Irrelevant, Self::Useless];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Irrelevant => "irrelevant",
            Self::Useless => "useless",
        }
    }
}

impl std::fmt::Display for DisposalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueId
// ---------------------------------------------------------------------------

/// Issue number, or a sentinel when neither the header nor the file name
/// carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueId {
    Number(u64),
    Unknown,
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("?"),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueDocument
// ---------------------------------------------------------------------------

/// A parsed issue export file.
#[derive(Debug, Clone)]
pub struct IssueDocument {
    /// Source file.
    pub path: PathBuf,
    /// Issue number from the header, file name, or [`IssueId::Unknown`].
    pub id: IssueId,
    /// Title from the header, or `"Unknown"`.
    pub title: String,
    /// Trimmed body of the `## Description` section (may be empty).
    pub description: String,
    /// Whether a `# #<id>: <title>` header was found.
    pub has_header: bool,
    /// Full raw file content.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of triaging one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    /// Document is disposable.
    Delete { reason: DisposalReason },
    /// Document is kept and reported under `category`.
    Keep { category: Category, summary: String },
}

impl Outcome {
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one triage run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
