//! Latency probe for an external AI command-line tool.
//!
//! Launches the configured command `parallel` times at once and measures
//! each invocation's wall-clock time. A failing or timed-out invocation is
//! reported in its [`ProbeRun`]; it does not abort the probe.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use triage_shared::{ProbeConfig, Result, TriageError};

/// What to run and how often.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub command: String,
    pub args: Vec<String>,
    /// Appended as the final argument when non-empty.
    pub prompt: String,
    /// Written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    pub parallel: usize,
    pub timeout: Duration,
}

impl From<&ProbeConfig> for ProbeRequest {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            prompt: config.prompt.clone(),
            stdin: config.stdin.clone(),
            parallel: config.parallel,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone)]
pub struct ProbeRun {
    pub index: usize,
    pub elapsed: Duration,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
    /// Spawn or I/O failure, if the command never produced a status.
    pub error: Option<String>,
}

impl ProbeRun {
    /// Last `max_chars` characters of the trimmed stdout.
    pub fn output_tail(&self, max_chars: usize) -> String {
        let trimmed = self.stdout.trim();
        let count = trimmed.chars().count();
        trimmed.chars().skip(count.saturating_sub(max_chars)).collect()
    }
}

/// All invocations plus total wall time.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Runs ordered by index.
    pub runs: Vec<ProbeRun>,
    pub wall_time: Duration,
}

impl ProbeReport {
    pub fn succeeded(&self) -> usize {
        self.runs.iter().filter(|r| r.success).count()
    }
}

/// Run the probe.
#[instrument(skip_all, fields(command = %request.command, parallel = request.parallel))]
pub async fn run_probe(request: &ProbeRequest) -> Result<ProbeReport> {
    if request.command.trim().is_empty() {
        return Err(TriageError::validation("probe command is empty"));
    }
    if request.parallel == 0 {
        return Err(TriageError::validation("probe parallelism must be at least 1"));
    }

    let start = Instant::now();
    let mut set = JoinSet::new();
    for index in 0..request.parallel {
        let request = request.clone();
        set.spawn(async move { run_once(index, &request).await });
    }

    let mut runs = Vec::with_capacity(request.parallel);
    while let Some(joined) = set.join_next().await {
        let run = joined.map_err(|e| TriageError::Probe(format!("probe task failed: {e}")))?;
        runs.push(run);
    }
    runs.sort_by_key(|r| r.index);

    let report = ProbeReport {
        runs,
        wall_time: start.elapsed(),
    };

    info!(
        succeeded = report.succeeded(),
        total = report.runs.len(),
        wall_ms = report.wall_time.as_millis(),
        "probe complete"
    );

    Ok(report)
}

async fn run_once(index: usize, request: &ProbeRequest) -> ProbeRun {
    debug!(index, "starting probe invocation");
    let start = Instant::now();

    let mut cmd = tokio::process::Command::new(&request.command);
    cmd.args(&request.args)
        .stdin(if request.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if !request.prompt.is_empty() {
        cmd.arg(&request.prompt);
    }

    let failed = |error: String, elapsed: Duration| ProbeRun {
        index,
        elapsed,
        exit_code: None,
        success: false,
        timed_out: false,
        stdout: String::new(),
        stderr: String::new(),
        error: Some(error),
    };

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(index, error = %e, "failed to spawn probe command");
            return failed(
                format!("failed to spawn `{}`: {e}", request.command),
                start.elapsed(),
            );
        }
    };

    // Stdin write and wait run concurrently under one timeout.
    let feed = feed_stdin(child.stdin.take(), request.stdin.clone());
    let exchange = async move { tokio::join!(feed, child.wait_with_output()) };

    match tokio::time::timeout(request.timeout, exchange).await {
        Ok((Ok(()), Ok(output))) => {
            let elapsed = start.elapsed();
            debug!(index, elapsed_ms = elapsed.as_millis(), "probe invocation finished");
            ProbeRun {
                index,
                elapsed,
                exit_code: output.status.code(),
                success: output.status.success(),
                timed_out: false,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                error: None,
            }
        }
        Ok((Err(e), _)) => failed(format!("failed to write stdin: {e}"), start.elapsed()),
        Ok((_, Err(e))) => failed(format!("failed to wait for child: {e}"), start.elapsed()),
        // Dropping the timed-out future drops the child, and kill_on_drop reaps it.
        Err(_) => {
            warn!(index, timeout_secs = request.timeout.as_secs(), "probe invocation timed out");
            ProbeRun {
                timed_out: true,
                ..failed(
                    format!("timed out after {:.1}s", request.timeout.as_secs_f64()),
                    start.elapsed(),
                )
            }
        }
    }
}

/// Write `input` to the child's stdin and close it.
///
/// A child that exits without reading its input is not an error here; its
/// exit status decides the run.
async fn feed_stdin(
    pipe: Option<tokio::process::ChildStdin>,
    input: Option<String>,
) -> std::io::Result<()> {
    let (Some(mut pipe), Some(input)) = (pipe, input) else {
        return Ok(());
    };
    match pipe.write_all(input.as_bytes()).await {
        Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &str, prompt: &str) -> ProbeRequest {
        ProbeRequest {
            command: command.into(),
            args: vec![],
            prompt: prompt.into(),
            stdin: None,
            parallel: 1,
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn request_from_default_config() {
        let req = ProbeRequest::from(&ProbeConfig::default());
        assert_eq!(req.command, "gemini");
        assert_eq!(req.args, vec!["-p".to_string()]);
        assert_eq!(req.parallel, 1);
        assert_eq!(req.timeout, Duration::from_secs(120));
    }

    #[test]
    fn output_tail_takes_last_chars() {
        let run = ProbeRun {
            index: 0,
            elapsed: Duration::ZERO,
            exit_code: Some(0),
            success: true,
            timed_out: false,
            stdout: "  the answer is 4\n".into(),
            stderr: String::new(),
            error: None,
        };
        assert_eq!(run.output_tail(4), "is 4");
        assert_eq!(run.output_tail(100), "the answer is 4");
    }

    #[tokio::test]
    async fn echo_probe_succeeds() {
        let report = run_probe(&request("echo", "fruit")).await.unwrap();
        assert_eq!(report.runs.len(), 1);
        let run = &report.runs[0];
        assert!(run.success);
        assert_eq!(run.exit_code, Some(0));
        assert_eq!(run.stdout.trim(), "fruit");
    }

    #[tokio::test]
    async fn stdin_is_forwarded() {
        let mut req = request("cat", "");
        req.stdin = Some("What is 2+2?".into());
        let report = run_probe(&req).await.unwrap();
        assert_eq!(report.runs[0].stdout, "What is 2+2?");
    }

    #[tokio::test]
    async fn parallel_runs_are_indexed() {
        let mut req = request("echo", "hi");
        req.parallel = 4;
        let report = run_probe(&req).await.unwrap();
        let indices: Vec<_> = report.runs.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(report.succeeded(), 4);
    }

    #[tokio::test]
    async fn missing_command_is_reported_not_fatal() {
        let report = run_probe(&request("triage-no-such-command-xyz", "x"))
            .await
            .unwrap();
        let run = &report.runs[0];
        assert!(!run.success);
        assert!(run.error.as_deref().unwrap().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let mut req = request("sleep", "5");
        req.timeout = Duration::from_millis(100);
        let report = run_probe(&req).await.unwrap();
        assert!(report.runs[0].timed_out);
        assert!(!report.runs[0].success);
    }

    #[tokio::test]
    async fn timeout_covers_unread_stdin() {
        let mut req = request("sleep", "3");
        req.stdin = Some("x".repeat(1 << 20));
        req.timeout = Duration::from_millis(200);
        let report = run_probe(&req).await.unwrap();
        let run = &report.runs[0];
        assert!(run.timed_out);
        assert!(!run.success);
        assert!(run.elapsed < Duration::from_secs(1), "elapsed {:?}", run.elapsed);
    }

    #[tokio::test]
    async fn child_ignoring_stdin_still_succeeds() {
        let mut req = request("true", "");
        req.stdin = Some("x".repeat(1 << 20));
        let report = run_probe(&req).await.unwrap();
        let run = &report.runs[0];
        assert!(run.success, "error: {:?}", run.error);
        assert!(!run.timed_out);
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = run_probe(&request("  ", "x")).await.unwrap_err();
        assert!(matches!(err, TriageError::Validation { .. }));
    }
}
