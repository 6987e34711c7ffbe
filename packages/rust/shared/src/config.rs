//! Application configuration for issue triage.
//!
//! User config lives at `~/.triage/triage.toml`.
//! CLI flags override config file values, which override defaults.
//! The keyword and marker tables are ordinary config data, so alternate
//! rule sets can be swapped in without touching code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::types::{Category, DisposalReason};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "triage.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".triage";

// ---------------------------------------------------------------------------
// Config structs (matching triage.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Disposal filter markers and ordering.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Category scoring rules.
    #[serde(default)]
    pub rules: RulesConfig,

    /// One-line summary settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// External AI CLI latency probe.
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding one Markdown file per issue.
    #[serde(default = "default_issues_dir")]
    pub issues_dir: String,

    /// Report file name, written inside `issues_dir` and never triaged itself.
    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Extension of issue documents (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Project name used in the report heading.
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Where to write the JSON run ledger, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            issues_dir: default_issues_dir(),
            report_file: default_report_file(),
            extension: default_extension(),
            project_name: default_project_name(),
            ledger_path: None,
        }
    }
}

fn default_issues_dir() -> String {
    "docs/issues".into()
}
fn default_report_file() -> String {
    "SUMMARY.md".into()
}
fn default_extension() -> String {
    "md".into()
}
fn default_project_name() -> String {
    "Binaryen".into()
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Order in which disposal predicates are tried; first match wins.
    #[serde(default = "default_filter_order")]
    pub order: Vec<DisposalReason>,

    /// Descriptions with fewer non-whitespace characters are useless.
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,

    /// Phrases marking an issue as a duplicate.
    #[serde(default = "default_duplicate_markers")]
    pub duplicate_markers: Vec<String>,

    /// Phrases marking an issue as noise.
    #[serde(default = "default_noise_markers")]
    pub noise_markers: Vec<String>,

    /// Phrases marking an issue as off-topic.
    #[serde(default = "default_irrelevant_markers")]
    pub irrelevant_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: default_filter_order(),
            min_description_chars: default_min_description_chars(),
            duplicate_markers: default_duplicate_markers(),
            noise_markers: default_noise_markers(),
            irrelevant_markers: default_irrelevant_markers(),
        }
    }
}

fn default_filter_order() -> Vec<DisposalReason> {
    vec![
        DisposalReason::Duplicate,
        DisposalReason::Useless,
        DisposalReason::Irrelevant,
    ]
}
fn default_min_description_chars() -> usize {
    10
}
fn default_duplicate_markers() -> Vec<String> {
    strings(&[
        "duplicate of #",
        "closing as duplicate",
        "marked as duplicate",
        "is a duplicate",
    ])
}
fn default_noise_markers() -> Vec<String> {
    strings(&["pure noise"])
}
fn default_irrelevant_markers() -> Vec<String> {
    strings(&["spam", "not about binaryen", "wrong repo"])
}

/// `[rules]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Extra points when a keyword also appears in the title.
    #[serde(default = "default_title_boost")]
    pub title_boost: u32,

    /// Keyword phrases per category.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordRule>,

    /// Fixed bonuses applied after keyword counting.
    #[serde(default = "default_bonuses")]
    pub bonuses: Vec<BonusRule>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            title_boost: default_title_boost(),
            keywords: default_keywords(),
            bonuses: default_bonuses(),
        }
    }
}

/// `[[rules.keywords]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub phrases: Vec<String>,
}

/// `[[rules.bonuses]]` entry: if any trigger occurs, add `bonus` to `category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusRule {
    pub category: Category,
    pub triggers: Vec<String>,
    pub bonus: u32,
}

fn default_title_boost() -> u32 {
    5
}

fn default_keywords() -> Vec<KeywordRule> {
    let table: [(Category, &[&str]); 10] = [
        (
            Category::Bug,
            &[
                "crash",
                "incorrect",
                "error",
                "bug ",
                "regression",
                "segfault",
                "assert",
                "fails to",
                "panic",
                "undefined behavior",
                "abort",
            ],
        ),
        (
            Category::Optimization,
            &[
                "missed optimization",
                "peephole",
                "pass improvement",
                "optimize ",
                "inline",
                "inlining",
                "dead code",
                "simplify",
                "shrink",
            ],
        ),
        (
            Category::Feature,
            &[
                "feature request",
                "proposal",
                "implement",
                "support for",
                "add support",
                "new instruction",
                "add ",
                "allow ",
            ],
        ),
        (
            Category::Performance,
            &[
                "speed",
                "size regression",
                "slow",
                "fast",
                "performance",
                "benchmark",
                "compile time",
                "memory leak",
            ],
        ),
        (
            Category::SpecCompliance,
            &[
                "spec ",
                "compliance",
                "validation",
                "webassembly spec",
                "compliant",
                "valid ",
                "invalid ",
                "type error",
            ],
        ),
        (
            Category::Api,
            &["c api", "js api", "bindings", "export", "header", "binaryen.js"],
        ),
        (
            Category::Meta,
            &["tracking issue", "epic", "plan", "roadmap", "meta issue"],
        ),
        (
            Category::TestCi,
            &[
                "test failure",
                "ci ",
                "failing test",
                "test suite",
                "builder",
                "bot ",
                "flake",
                "asan",
                "ubsan",
                "lit test",
                "fuzzer",
            ],
        ),
        (
            Category::Docs,
            &["doc ", "readme", "typo", "documentation", "comment "],
        ),
        (
            Category::KnownLimitation,
            &[
                "won't fix",
                "limitation",
                "known issue",
                "design choice",
                "by design",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(category, phrases)| KeywordRule {
            category,
            phrases: strings(phrases),
        })
        .collect()
}

fn default_bonuses() -> Vec<BonusRule> {
    vec![
        BonusRule {
            category: Category::Bug,
            triggers: strings(&["crash", "segfault", "assert"]),
            bonus: 10,
        },
        BonusRule {
            category: Category::Optimization,
            triggers: strings(&["duplicate-function-elimination"]),
            bonus: 5,
        },
        BonusRule {
            category: Category::SpecCompliance,
            triggers: strings(&["validation", "validator"]),
            bonus: 5,
        },
    ]
}

/// `[summary]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// A sentence must be longer than this (in characters) to be used.
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    /// Longer sentences are cut and suffixed with `...`.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Used when the description is empty.
    #[serde(default = "default_empty_placeholder")]
    pub empty_placeholder: String,

    /// Used when no sentence qualifies.
    #[serde(default = "default_fallback_placeholder")]
    pub fallback_placeholder: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: default_min_sentence_chars(),
            max_chars: default_max_chars(),
            empty_placeholder: default_empty_placeholder(),
            fallback_placeholder: default_fallback_placeholder(),
        }
    }
}

fn default_min_sentence_chars() -> usize {
    15
}
fn default_max_chars() -> usize {
    80
}
fn default_empty_placeholder() -> String {
    "No description provided.".into()
}
fn default_fallback_placeholder() -> String {
    "See issue for details.".into()
}

/// `[probe]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Executable to run.
    #[serde(default = "default_probe_command")]
    pub command: String,

    /// Arguments placed before the prompt.
    #[serde(default = "default_probe_args")]
    pub args: Vec<String>,

    /// Prompt passed as the final argument.
    #[serde(default = "default_probe_prompt")]
    pub prompt: String,

    /// Text written to the child's stdin, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    /// Number of concurrent invocations.
    #[serde(default = "default_probe_parallel")]
    pub parallel: usize,

    /// Per-invocation timeout in seconds.
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: default_probe_command(),
            args: default_probe_args(),
            prompt: default_probe_prompt(),
            stdin: None,
            parallel: default_probe_parallel(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_command() -> String {
    "gemini".into()
}
fn default_probe_args() -> Vec<String> {
    strings(&["-p"])
}
fn default_probe_prompt() -> String {
    "Categorize the word 'apple' into one of: fruit, vegetable, meat. Output only the category."
        .into()
}
fn default_probe_parallel() -> usize {
    1
}
fn default_probe_timeout() -> u64 {
    120
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Triage config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime triage configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Directory holding the issue documents.
    pub issues_dir: PathBuf,
    /// Report file name inside `issues_dir`.
    pub report_file: String,
    /// Issue document extension.
    pub extension: String,
    /// Project name for the report heading.
    pub project_name: String,
    /// Optional JSON ledger destination.
    pub ledger_path: Option<PathBuf>,
    pub filter: FilterConfig,
    pub rules: RulesConfig,
    pub summary: SummaryConfig,
}

impl TriageConfig {
    /// Full path of the report file.
    pub fn report_path(&self) -> PathBuf {
        self.issues_dir.join(&self.report_file)
    }
}

impl From<&AppConfig> for TriageConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            issues_dir: PathBuf::from(&config.defaults.issues_dir),
            report_file: config.defaults.report_file.clone(),
            extension: config.defaults.extension.clone(),
            project_name: config.defaults.project_name.clone(),
            ledger_path: config.defaults.ledger_path.as_ref().map(PathBuf::from),
            filter: config.filter.clone(),
            rules: config.rules.clone(),
            summary: config.summary.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.triage/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TriageError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.triage/triage.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TriageError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| TriageError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TriageError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TriageError::Serialization(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TriageError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the pipeline cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let order = &config.filter.order;
    for (i, reason) in order.iter().enumerate() {
        if order[..i].contains(reason) {
            return Err(TriageError::validation(format!(
                "filter order lists '{reason}' more than once"
            )));
        }
    }
    for reason in DisposalReason::ALL {
        if !order.contains(&reason) {
            return Err(TriageError::validation(format!(
                "filter order is missing '{reason}'"
            )));
        }
    }

    for rule in &config.rules.keywords {
        if rule.phrases.iter().any(|p| p.is_empty()) {
            return Err(TriageError::validation(format!(
                "empty keyword phrase for category '{}'",
                rule.category
            )));
        }
    }

    for rule in &config.rules.bonuses {
        if rule.triggers.iter().any(|t| t.is_empty()) {
            return Err(TriageError::validation(format!(
                "empty bonus trigger for category '{}'",
                rule.category
            )));
        }
    }

    if config.summary.max_chars < 4 {
        return Err(TriageError::validation(
            "summary.max_chars must be at least 4",
        ));
    }

    if config.probe.parallel == 0 {
        return Err(TriageError::validation("probe.parallel must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("issues_dir"));
        assert!(toml_str.contains("known-limitation"));
        assert!(toml_str.contains("duplicate of #"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.rules.title_boost, 5);
        assert_eq!(parsed.rules.keywords.len(), Category::ALL.len());
        assert_eq!(parsed.filter.order[0], DisposalReason::Duplicate);
        assert_eq!(parsed.probe.command, "gemini");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[defaults]
issues_dir = "/tmp/issues"

[filter]
min_description_chars = 20
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.issues_dir, "/tmp/issues");
        assert_eq!(config.defaults.report_file, "SUMMARY.md");
        assert_eq!(config.filter.min_description_chars, 20);
        assert_eq!(config.filter.duplicate_markers.len(), 4);
        assert_eq!(config.summary.max_chars, 80);
    }

    #[test]
    fn custom_rule_table_parses() {
        let toml_str = r#"
[rules]
title_boost = 2

[[rules.keywords]]
category = "docs"
phrases = ["manual", "guide"]

[[rules.bonuses]]
category = "bug"
triggers = ["oops"]
bonus = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.rules.title_boost, 2);
        assert_eq!(config.rules.keywords.len(), 1);
        assert_eq!(config.rules.keywords[0].category, Category::Docs);
        assert_eq!(config.rules.bonuses[0].bonus, 3);
    }

    #[test]
    fn unknown_category_rejected() {
        let toml_str = r#"
[[rules.keywords]]
category = "bugs"
phrases = ["x"]
"#;
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn triage_config_from_app_config() {
        let app = AppConfig::default();
        let triage = TriageConfig::from(&app);
        assert_eq!(triage.issues_dir, PathBuf::from("docs/issues"));
        assert_eq!(triage.report_path(), PathBuf::from("docs/issues/SUMMARY.md"));
        assert!(triage.ledger_path.is_none());
    }

    #[test]
    fn duplicate_filter_order_rejected() {
        let mut config = AppConfig::default();
        config.filter.order = vec![DisposalReason::Useless, DisposalReason::Useless];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn incomplete_filter_order_rejected() {
        let mut config = AppConfig::default();
        config.filter.order = vec![DisposalReason::Irrelevant, DisposalReason::Duplicate];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("missing 'useless'"));

        let config: AppConfig = toml::from_str("[filter]\norder = []").expect("parse");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn reordered_filter_stages_accepted() {
        let mut config = AppConfig::default();
        config.filter.order = vec![
            DisposalReason::Irrelevant,
            DisposalReason::Useless,
            DisposalReason::Duplicate,
        ];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_parallelism_rejected() {
        let mut config = AppConfig::default();
        config.probe.parallel = 0;
        assert!(validate_config(&config).is_err());
        assert!(validate_config(&AppConfig::default()).is_ok());
    }
}
