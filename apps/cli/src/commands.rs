//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use triage_core::pipeline::{Classifier, Mode, ProgressReporter, TriageResult};
use triage_core::probe::{ProbeRequest, run_probe};
use triage_shared::{
    AppConfig, Category, DisposalReason, Outcome, TriageConfig, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Categorize exported issues and prune the noise.
#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Categorize bug-tracker export files and write a summary report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.triage/triage.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Classify every issue document and build the summary report.
    Run {
        /// Directory of issue documents (defaults to config `issues_dir`).
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Write the report and delete disposable documents.
        /// Without this flag nothing on disk is changed.
        #[arg(long)]
        apply: bool,

        /// Write a JSON ledger of every outcome to this path.
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Project name for the report heading.
        #[arg(long)]
        project: Option<String>,
    },

    /// Show how a single document would be classified.
    Explain {
        /// Issue document to inspect.
        file: PathBuf,
    },

    /// Measure latency of an external AI command-line tool.
    Probe {
        /// Number of concurrent invocations.
        #[arg(short = 'n', long)]
        parallel: Option<usize>,

        /// Executable to run (e.g. gemini).
        #[arg(long)]
        command: Option<String>,

        /// Prompt passed as the last argument.
        #[arg(long)]
        prompt: Option<String>,

        /// Text fed to the command on stdin.
        #[arg(long)]
        stdin: Option<String>,

        /// Per-invocation timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "triage=info",
        1 => "triage=debug",
        _ => "triage=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run {
            dir,
            apply,
            ledger,
            project,
        } => cmd_run(config_path, dir, apply, ledger, project),
        Command::Explain { file } => cmd_explain(config_path, &file),
        Command::Probe {
            parallel,
            command,
            prompt,
            stdin,
            timeout,
        } => cmd_probe(config_path, parallel, command, prompt, stdin, timeout).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn cmd_run(
    config_path: Option<&Path>,
    dir: Option<PathBuf>,
    apply: bool,
    ledger: Option<PathBuf>,
    project: Option<String>,
) -> Result<()> {
    let app_config = resolve_config(config_path)?;
    let mut config = TriageConfig::from(&app_config);

    if let Some(dir) = dir {
        config.issues_dir = dir;
    }
    if let Some(ledger) = ledger {
        config.ledger_path = Some(ledger);
    }
    if let Some(project) = project {
        config.project_name = project;
    }

    if !config.issues_dir.is_dir() {
        return Err(eyre!(
            "issues directory '{}' does not exist",
            config.issues_dir.display()
        ));
    }

    let mode = if apply { Mode::Apply } else { Mode::DryRun };
    info!(dir = %config.issues_dir.display(), %mode, "triaging issues");

    let reporter = CliProgress::new();
    let result = triage_core::pipeline::run_triage(&config, mode, &reporter)?;

    print_run_summary(&result);
    Ok(())
}

fn print_run_summary(result: &TriageResult) {
    let counts = &result.counts;

    println!();
    println!("  Triage complete ({})", result.mode);
    println!("  Total:    {}", counts.total);
    println!("  Kept:     {}", counts.kept_total());
    println!(
        "  Deleted:  {} ({} duplicate, {} irrelevant, {} useless)",
        counts.deleted_total(),
        counts.deleted_for(DisposalReason::Duplicate),
        counts.deleted_for(DisposalReason::Irrelevant),
        counts.deleted_for(DisposalReason::Useless),
    );
    println!();
    for category in Category::ALL {
        println!("  {:<17} {}", format!("{category}:"), counts.kept_in(category));
    }
    println!();
    match result.mode {
        Mode::Apply => {
            println!("  Report:   {}", result.report_path.display());
            println!("  Removed:  {} files", result.deleted_paths.len());
        }
        Mode::DryRun => {
            println!("  Dry run: nothing was written or deleted. Re-run with --apply.");
        }
    }
    if let Some(ledger) = &result.ledger_path {
        println!("  Ledger:   {}", ledger.display());
    }
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_triaged(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Classifying [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &TriageResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// explain
// ---------------------------------------------------------------------------

fn cmd_explain(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let app_config = resolve_config(config_path)?;
    let classifier = Classifier::new(&TriageConfig::from(&app_config));
    let doc = triage_markdown::read_issue(file)?;

    println!();
    println!("  File:     {}", doc.path.display());
    println!("  Issue:    #{}", doc.id);
    println!("  Title:    {}", doc.title);
    if !doc.has_header {
        println!("  Header:   missing (id from file name)");
    }
    println!(
        "  Desc:     {} non-whitespace chars",
        doc.description.chars().filter(|c| !c.is_whitespace()).count()
    );

    let verdict = classifier.judge(&doc);
    match verdict.outcome {
        Outcome::Delete { reason } => {
            println!("  Outcome:  delete ({reason})");
        }
        Outcome::Keep { category, summary } => {
            println!("  Outcome:  keep as {category}");
            match verdict.scores.filter(|card| !card.is_empty()) {
                Some(card) => {
                    println!("  Scores:");
                    for (c, score) in card.ranked() {
                        println!("    {:<17} {score}", c.as_str());
                    }
                }
                None => println!("  Scores:   none (default category)"),
            }
            println!("  Summary:  {summary}");
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// probe
// ---------------------------------------------------------------------------

async fn cmd_probe(
    config_path: Option<&Path>,
    parallel: Option<usize>,
    command: Option<String>,
    prompt: Option<String>,
    stdin: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let app_config = resolve_config(config_path)?;
    let mut request = ProbeRequest::from(&app_config.probe);

    if let Some(n) = parallel {
        request.parallel = n;
    }
    if let Some(command) = command {
        request.command = command;
    }
    if let Some(prompt) = prompt {
        request.prompt = prompt;
    }
    if stdin.is_some() {
        request.stdin = stdin;
    }
    if let Some(secs) = timeout {
        request.timeout = Duration::from_secs(secs);
    }

    info!(command = %request.command, parallel = request.parallel, "probing command latency");

    let report = run_probe(&request).await?;

    println!();
    for run in &report.runs {
        let status = match (&run.error, run.exit_code) {
            (Some(err), _) => err.clone(),
            (None, Some(code)) => format!("exit {code}"),
            (None, None) => "killed by signal".to_string(),
        };
        println!(
            "  Run {}: {:.2}s  {}  {}",
            run.index,
            run.elapsed.as_secs_f64(),
            status,
            run.output_tail(40)
        );
    }
    println!();
    println!(
        "  Succeeded: {}/{}",
        report.succeeded(),
        report.runs.len()
    );
    println!("  Time:      {:.2}s", report.wall_time.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
