//! Subprocess-backed probes (ping, traceroute)

use crate::probe::{bounded, Probe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostwatch_core::{CheckKind, Host, Outcome, OutcomePayload, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Number of echo requests sent by the ICMP probe
pub const PACKET_COUNT: u32 = 5;

/// Builds the command line (program followed by arguments) for a host
pub type CommandBuilder = Arc<dyn Fn(&Host) -> Vec<String> + Send + Sync>;

/// Decides from the collected output lines whether the host was reachable
pub type OutputClassifier = Arc<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Check kinds backed by a subprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// `ping`
    Icmp,
    /// `traceroute`
    Traceroute,
}

impl ProcessKind {
    fn check_kind(self) -> CheckKind {
        match self {
            ProcessKind::Icmp => CheckKind::Icmp,
            ProcessKind::Traceroute => CheckKind::Traceroute,
        }
    }

    fn payload(self, lines: Vec<String>) -> OutcomePayload {
        match self {
            ProcessKind::Icmp => OutcomePayload::Icmp { lines },
            ProcessKind::Traceroute => OutcomePayload::Traceroute { lines },
        }
    }
}

/// Probe that runs a command and classifies its output
#[derive(Clone)]
pub struct ProcessProbe {
    kind: ProcessKind,
    command: CommandBuilder,
    classify: OutputClassifier,
    timeout_duration: Duration,
}

impl fmt::Debug for ProcessProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessProbe")
            .field("kind", &self.kind)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

impl ProcessProbe {
    /// Create a probe from a command builder and an output classifier
    pub fn new(
        kind: ProcessKind,
        command: CommandBuilder,
        classify: OutputClassifier,
        timeout_duration: Duration,
    ) -> Self {
        Self {
            kind,
            command,
            classify,
            timeout_duration,
        }
    }

    /// ICMP probe using the system `ping` command
    pub fn icmp(timeout_duration: Duration) -> Self {
        Self::new(
            ProcessKind::Icmp,
            Arc::new(icmp_command),
            Arc::new(icmp_succeeded),
            timeout_duration,
        )
    }

    /// Traceroute probe using the system `traceroute` command
    pub fn traceroute(timeout_duration: Duration) -> Self {
        Self::new(
            ProcessKind::Traceroute,
            Arc::new(traceroute_command),
            Arc::new(traceroute_succeeded),
            timeout_duration,
        )
    }

    fn outcome(
        &self,
        successful: bool,
        host: &Host,
        started: DateTime<Utc>,
        lines: Vec<String>,
    ) -> Outcome {
        Outcome::new(successful, host.clone(), started, self.kind.payload(lines))
    }

    /// Run the command and collect its output lines. Launch failures, I/O
    /// errors, timeouts, and non-zero exits are returned as failures; a
    /// timed out run keeps the lines read before the deadline.
    async fn execute(&self, command: &[String]) -> std::result::Result<Vec<String>, Failure> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Failure::new("empty command line"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Failure::new(format!("Failed to launch '{}': {}", program, e)))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let run = async {
            let (status, out, err) = tokio::join!(
                child.wait(),
                read_lines(stdout_pipe, &mut stdout),
                read_lines(stderr_pipe, &mut stderr),
            );
            out.and(err).and(status)
        };

        let status = bounded(self.timeout_duration, run).await;
        let mut lines = stdout;
        lines.append(&mut stderr);

        let status = match status {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                return Err(Failure::new(format!(
                    "I/O error while running '{}': {}",
                    program, e
                )))
            }
            None => {
                return Err(Failure {
                    message: format!(
                        "'{}' timed out after {}ms",
                        program,
                        self.timeout_duration.as_millis()
                    ),
                    lines,
                })
            }
        };

        if !status.success() {
            return Err(Failure::new(match status.code() {
                Some(code) => format!("Command execution failed with exit code: {}", code),
                None => "Command execution terminated by signal".to_string(),
            }));
        }

        Ok(lines)
    }
}

/// Why a command produced no usable result, with any output read before it stopped
#[derive(Debug)]
struct Failure {
    message: String,
    lines: Vec<String>,
}

impl Failure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            lines: Vec::new(),
        }
    }

    fn into_lines(self) -> Vec<String> {
        let mut lines = self.lines;
        lines.push(format!("Error: {}", self.message));
        lines
    }
}

/// Append trimmed non-blank lines from `pipe` to `sink` until EOF
async fn read_lines<R>(pipe: Option<R>, sink: &mut Vec<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return Ok(());
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf).trim().to_string();
        if !line.is_empty() {
            sink.push(line);
        }
    }
}

#[async_trait]
impl Probe for ProcessProbe {
    fn kind(&self) -> CheckKind {
        self.kind.check_kind()
    }

    async fn ping(&self, host: &Host) -> Result<Outcome> {
        let started = Utc::now();
        let command = (self.command)(host);

        debug!(kind = %self.kind(), host = %host, command = ?command, "Running probe command");

        match self.execute(&command).await {
            Ok(lines) => {
                let successful = (self.classify)(&lines);
                debug!(
                    kind = %self.kind(),
                    host = %host,
                    successful,
                    lines = lines.len(),
                    "Probe command finished"
                );
                Ok(self.outcome(successful, host, started, lines))
            }
            Err(failure) => {
                warn!(
                    kind = %self.kind(),
                    host = %host,
                    error = %failure.message,
                    partial_lines = failure.lines.len(),
                    "Probe command failed"
                );
                Ok(self.outcome(false, host, started, failure.into_lines()))
            }
        }
    }
}

/// `ping` invocation for the current platform
pub fn icmp_command(host: &Host) -> Vec<String> {
    let count_flag = if cfg!(windows) { "-n" } else { "-c" };
    vec![
        "ping".to_string(),
        count_flag.to_string(),
        PACKET_COUNT.to_string(),
        host.to_string(),
    ]
}

static ZERO_LOSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^0-9.])0(\.0+)?% packet loss|Lost = 0\b").expect("valid packet loss pattern")
});

/// Reachable iff the summary reports zero packet loss
pub fn icmp_succeeded(lines: &[String]) -> bool {
    lines.iter().any(|line| ZERO_LOSS.is_match(line))
}

/// `traceroute` invocation for the current platform
pub fn traceroute_command(host: &Host) -> Vec<String> {
    if cfg!(windows) {
        vec!["tracert".to_string(), host.to_string()]
    } else {
        vec!["traceroute".to_string(), "-I".to_string(), host.to_string()]
    }
}

static SILENT_HOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\* \* \*").expect("valid silent hop pattern"));

/// Unreachable iff any hop timed out
pub fn traceroute_succeeded(lines: &[String]) -> bool {
    !lines
        .iter()
        .any(|line| line.contains("Request timed out.") || SILENT_HOP.is_match(line))
}
