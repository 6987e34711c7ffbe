//! Core pipeline orchestration and domain logic for issue triage.
//!
//! This crate ties together document parsing, the disposal filter, category
//! scoring, and report rendering into one batch pipeline (`run_triage`),
//! plus the external-CLI latency probe.

pub mod filter;
pub mod ledger;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod scorer;
