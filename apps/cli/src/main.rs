//! `triage`: sort bug-tracker export files into a categorized summary.
//!
//! Classifies one-issue-per-file Markdown exports, writes an aggregated
//! report, and removes documents judged disposable.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
