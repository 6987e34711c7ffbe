//! Shared types, error model, and configuration for issue triage.
//!
//! This crate is the foundation depended on by all other triage crates.
//! It provides:
//! - [`TriageError`]: the unified error type
//! - Domain types ([`IssueDocument`], [`Category`], [`DisposalReason`], [`Outcome`])
//! - Configuration ([`AppConfig`], [`TriageConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BonusRule, DefaultsConfig, FilterConfig, KeywordRule, ProbeConfig, RulesConfig,
    SummaryConfig, TriageConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, validate_config,
};
pub use error::{Result, TriageError};
pub use types::{Category, DisposalReason, IssueDocument, IssueId, Outcome, RunId};
