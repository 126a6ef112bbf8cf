// file: src/executor.rs
// version: 1.0.0
// guid: 9b47d0e2-58c1-4a36-bf0e-e2c63a19f8d5

//! Supervised execution of external tools
//!
//! Output of a started process is echoed line by line as it arrives, with
//! stdout and stderr interleaved in arrival order.

use crate::{ClusterError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Output lines kept by a non-capturing runner for error reports
pub const OUTPUT_TAIL_LINES: usize = 20;

/// A single external command to run to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I, working_dir: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// Command line as shown to the operator
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a finished process exited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Output lines, all of them for capturing runners and the last
    /// [`OUTPUT_TAIL_LINES`] otherwise
    pub lines: Vec<String>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into a process error
    pub fn check(self, invocation: &Invocation) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        Err(ClusterError::Process {
            command: invocation.display(),
            exit_code: self.exit_code,
            stderr: self
                .lines
                .iter()
                .rev()
                .find(|line| !line.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| "no output".to_string()),
        })
    }
}

/// Runs external tools on behalf of the sequencers
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve a tool on PATH
    async fn locate(&self, tool: &str) -> Result<PathBuf>;

    /// Capture a tool's version banner
    async fn version(&self, tool: &str, args: &[&str]) -> Result<String>;

    /// Run to completion, streaming output
    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome>;
}

/// Runs real processes on the local machine
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    capture: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self { capture: false }
    }

    /// Runner that keeps every output line in the outcome
    pub fn capturing() -> Self {
        Self { capture: true }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn locate(&self, tool: &str) -> Result<PathBuf> {
        which::which(tool).map_err(|_| ClusterError::tool_not_found(tool))
    }

    async fn version(&self, tool: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(tool)
            .args(args)
            .output()
            .await
            .map_err(|e| ClusterError::Process {
                command: format!("{} {}", tool, args.join(" ")),
                exit_code: None,
                stderr: format!("Failed to execute command: {}", e),
            })?;

        if !output.status.success() {
            return Err(ClusterError::Process {
                command: format!("{} {}", tool, args.join(" ")),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome> {
        info!(
            "Running '{}' in {}",
            invocation.display(),
            invocation.working_dir.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClusterError::Process {
                command: invocation.display(),
                exit_code: None,
                stderr: format!("Failed to start command: {}", e),
            })?;

        let mut lines = VecDeque::new();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        if let (Some(stdout), Some(stderr)) = (stdout, stderr) {
            let mut out_lines = BufReader::new(stdout).split(b'\n');
            let mut err_lines = BufReader::new(stderr).split(b'\n');
            let mut out_open = true;
            let mut err_open = true;

            while out_open || err_open {
                let segment = tokio::select! {
                    segment = out_lines.next_segment(), if out_open => {
                        next_line(segment, "stdout", &mut out_open)
                    }
                    segment = err_lines.next_segment(), if err_open => {
                        next_line(segment, "stderr", &mut err_open)
                    }
                };

                if let Some(line) = segment {
                    println!("{}", line);
                    if !self.capture && lines.len() == OUTPUT_TAIL_LINES {
                        lines.pop_front();
                    }
                    lines.push_back(line);
                }
            }
        }

        let status = child.wait().await?;
        debug!("'{}' exited with {}", invocation.program, status);

        Ok(RunOutcome {
            exit_code: status.code(),
            lines: lines.into(),
        })
    }
}

/// Decode one output segment, closing the stream on end of input or read failure
fn next_line(
    segment: std::io::Result<Option<Vec<u8>>>,
    stream: &str,
    open: &mut bool,
) -> Option<String> {
    match segment {
        Ok(Some(bytes)) => {
            let line = String::from_utf8_lossy(&bytes);
            Some(line.strip_suffix('\r').unwrap_or(&line).to_string())
        }
        Ok(None) => {
            *open = false;
            None
        }
        Err(e) => {
            warn!("Stopped reading {}: {}", stream, e);
            *open = false;
            None
        }
    }
}
