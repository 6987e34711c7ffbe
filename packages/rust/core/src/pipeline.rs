//! End-to-end triage pipeline: list → parse → filter/score → report → apply.
//!
//! One pipeline serves both modes. [`Mode::DryRun`] computes everything and
//! touches nothing; [`Mode::Apply`] overwrites the report file and then
//! deletes every disposable document.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use triage_shared::{IssueDocument, Outcome, Result, RunId, SummaryConfig, TriageConfig, TriageError};

use crate::filter::DisposalFilter;
use crate::ledger::{self, RunLedger};
use crate::report::{self, TriageCounts, TriagedDocument};
use crate::scorer::{ScoreCard, Scorer};

/// Whether a run may modify the issues directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Classify and report counts only.
    DryRun,
    /// Write the report and delete disposable documents.
    Apply,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DryRun => f.write_str("dry-run"),
            Self::Apply => f.write_str("apply"),
        }
    }
}

/// Result of [`run_triage`].
#[derive(Debug)]
pub struct TriageResult {
    pub run_id: RunId,
    pub mode: Mode,
    pub counts: TriageCounts,
    /// Every input document, in processing order.
    pub documents: Vec<TriagedDocument>,
    /// Rendered report (written only in apply mode).
    pub report: String,
    pub report_path: PathBuf,
    /// Files actually removed (empty in dry-run mode).
    pub deleted_paths: Vec<PathBuf>,
    /// Where the ledger was written, if requested.
    pub ledger_path: Option<PathBuf>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document is classified.
    fn document_triaged(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &TriageResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_triaged(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &TriageResult) {}
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Disposal filter, scorer, and summary settings bundled for per-document use.
#[derive(Debug, Clone)]
pub struct Classifier {
    filter: DisposalFilter,
    scorer: Scorer,
    summary: SummaryConfig,
}

/// An outcome together with the score card that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// `None` when the document was disposed of before scoring.
    pub scores: Option<ScoreCard>,
}

impl Classifier {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            filter: DisposalFilter::new(&config.filter),
            scorer: Scorer::new(&config.rules),
            summary: config.summary.clone(),
        }
    }

    /// Decide the outcome for one parsed document.
    pub fn classify(&self, doc: &IssueDocument) -> Outcome {
        self.judge(doc).outcome
    }

    /// Like [`Classifier::classify`], keeping the scores for display.
    pub fn judge(&self, doc: &IssueDocument) -> Verdict {
        if let Some(reason) = self.filter.check(doc) {
            return Verdict {
                outcome: Outcome::Delete { reason },
                scores: None,
            };
        }

        let card = self.scorer.score(&doc.title, &doc.description);
        Verdict {
            outcome: Outcome::Keep {
                category: card.category(),
                summary: triage_markdown::summarize(&doc.description, &self.summary),
            },
            scores: Some(card),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full triage pipeline.
///
/// 1. List issue documents
/// 2. Parse and classify each one
/// 3. Render the report
/// 4. Apply mode: write the report, then delete disposable documents
/// 5. Write the ledger if configured
#[instrument(skip_all, fields(dir = %config.issues_dir.display(), %mode))]
pub fn run_triage(
    config: &TriageConfig,
    mode: Mode,
    progress: &dyn ProgressReporter,
) -> Result<TriageResult> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, "starting triage run");

    // --- Phase 1: List ---
    progress.phase("Listing issue documents");
    let files = list_issue_files(config)?;
    let total = files.len();
    debug!(total, "issue documents found");

    // --- Phase 2: Classify ---
    progress.phase("Classifying issues");
    let classifier = Classifier::new(config);
    let mut documents = Vec::with_capacity(total);
    let mut counts = TriageCounts::default();

    for (i, path) in files.iter().enumerate() {
        let doc = triage_markdown::read_issue(path)?;
        let outcome = classifier.classify(&doc);
        debug!(path = %path.display(), id = %doc.id, ?outcome, "classified");

        counts.record(&outcome);
        documents.push(TriagedDocument {
            path: doc.path,
            id: doc.id,
            title: doc.title,
            content_hash: content_hash(&doc.content),
            outcome,
        });
        progress.document_triaged(&path.display().to_string(), i + 1, total);
    }

    // --- Phase 3: Report ---
    progress.phase("Rendering report");
    let report = report::render_report(&config.project_name, &documents);
    let report_path = config.report_path();

    // --- Phase 4: Apply ---
    let mut deleted_paths = Vec::new();
    if mode == Mode::Apply {
        progress.phase("Writing report");
        std::fs::write(&report_path, &report).map_err(|e| TriageError::io(&report_path, e))?;
        info!(path = %report_path.display(), "report written");

        progress.phase("Deleting disposable documents");
        for doc in documents.iter().filter(|d| d.outcome.is_delete()) {
            std::fs::remove_file(&doc.path).map_err(|e| TriageError::io(&doc.path, e))?;
            debug!(path = %doc.path.display(), "deleted");
            deleted_paths.push(doc.path.clone());
        }
    }

    // --- Phase 5: Ledger ---
    let ledger_path = match &config.ledger_path {
        Some(path) => {
            progress.phase("Writing ledger");
            let ledger = RunLedger::new(run_id.clone(), mode, &config.issues_dir, &counts, &documents);
            ledger::write_ledger(path, &ledger)?;
            Some(path.clone())
        }
        None => None,
    };

    let result = TriageResult {
        run_id,
        mode,
        counts,
        documents,
        report,
        report_path,
        deleted_paths,
        ledger_path,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        run_id = %result.run_id,
        total = result.counts.total,
        kept = result.counts.kept_total(),
        deleted = result.counts.deleted_total(),
        elapsed_ms = result.elapsed.as_millis(),
        "triage run complete"
    );

    Ok(result)
}

/// List issue documents in processing order.
///
/// Files must carry the configured extension; the report file is skipped.
/// Order is by numeric file stem (non-numeric stems count as 0), then name.
pub fn list_issue_files(config: &TriageConfig) -> Result<Vec<PathBuf>> {
    let dir = &config.issues_dir;
    let entries = std::fs::read_dir(dir).map_err(|e| TriageError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TriageError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(config.extension.as_str()) {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some(config.report_file.as_str()) {
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| {
        numeric_stem(a)
            .cmp(&numeric_stem(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });

    Ok(files)
}

fn numeric_stem(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
