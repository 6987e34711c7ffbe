//! JSON run ledger.
//!
//! Deletions are irreversible, so a run can optionally record every
//! document's outcome together with the hash of the content it had.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use triage_shared::{Result, RunId, TriageError};

use crate::pipeline::Mode;
use crate::report::{TriageCounts, TriagedDocument};

/// Current schema version for the ledger format.
pub const LEDGER_SCHEMA_VERSION: u32 = 1;

/// The ledger file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLedger {
    pub schema_version: u32,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub mode: Mode,
    pub issues_dir: String,
    pub tool_version: String,
    pub counts: TriageCounts,
    pub documents: Vec<TriagedDocument>,
}

impl RunLedger {
    pub fn new(
        run_id: RunId,
        mode: Mode,
        issues_dir: &Path,
        counts: &TriageCounts,
        documents: &[TriagedDocument],
    ) -> Self {
        Self {
            schema_version: LEDGER_SCHEMA_VERSION,
            run_id,
            generated_at: Utc::now(),
            mode,
            issues_dir: issues_dir.display().to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            counts: counts.clone(),
            documents: documents.to_vec(),
        }
    }
}

/// Serialize the ledger as pretty JSON, creating parent directories.
pub fn write_ledger(path: &Path, ledger: &RunLedger) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| TriageError::io(parent, e))?;
        }
    }

    let json = serde_json::to_string_pretty(ledger)
        .map_err(|e| TriageError::Serialization(format!("ledger: {e}")))?;
    std::fs::write(path, json).map_err(|e| TriageError::io(path, e))?;

    info!(path = %path.display(), documents = ledger.documents.len(), "ledger written");
    Ok(())
}
