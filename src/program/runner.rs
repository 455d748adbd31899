//! Running external programs with a time limit.

use crate::error::GenerationError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// One program execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name used in diagnostics, usually the command's first token
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    pub time_limit: Duration,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, program: PathBuf, time_limit: Duration) -> Self {
        Self {
            name: name.into(),
            program,
            args: Vec::new(),
            stdin: None,
            time_limit,
            cwd: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_stdin(mut self, stdin: Vec<u8>) -> Self {
        self.stdin = Some(stdin);
        self
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Exited(i32),
    /// Terminated by a signal before exiting
    Signaled,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub status: ExitState,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
}

impl RunOutput {
    pub fn exited(code: i32, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            status: ExitState::Exited(code),
            stdout: stdout.into(),
            stderr: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            status: ExitState::TimedOut,
            stdout: Vec::new(),
            stderr: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.status == ExitState::Exited(0)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// Stdout of a successful run; timeouts and other exits become errors.
    pub fn into_stdout(self, invocation: &Invocation) -> Result<Vec<u8>, GenerationError> {
        match self.status {
            ExitState::Exited(0) => Ok(self.stdout),
            ExitState::TimedOut => Err(GenerationError::Timeout {
                program: invocation.name.clone(),
                limit: invocation.time_limit,
            }),
            ExitState::Exited(code) => Err(GenerationError::NonZeroExit {
                program: invocation.name.clone(),
                code: Some(code),
                stderr: self.stderr_text(),
            }),
            ExitState::Signaled => Err(GenerationError::NonZeroExit {
                program: invocation.name.clone(),
                code: None,
                stderr: self.stderr_text(),
            }),
        }
    }
}

/// Executes programs for the generator, solutions, visualizers and validators.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion or until the time limit. A timeout is reported as
    /// [`ExitState::TimedOut`]; `Err` is reserved for failing to start the program.
    async fn run(&self, invocation: &Invocation) -> Result<RunOutput, GenerationError>;
}

/// Runs programs as child processes on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunOutput, GenerationError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|err| GenerationError::Spawn {
            program: invocation.name.clone(),
            message: err.to_string(),
        })?;

        if let (Some(bytes), Some(mut stdin)) = (invocation.stdin.clone(), child.stdin.take()) {
            let name = invocation.name.clone();
            tokio::spawn(async move {
                // Programs may exit without reading all of their input.
                if let Err(err) = stdin.write_all(&bytes).await {
                    debug!(program = %name, error = %err, "Stdin closed early");
                }
            });
        }

        match tokio::time::timeout(invocation.time_limit, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let status = match output.status.code() {
                    Some(code) => ExitState::Exited(code),
                    None => ExitState::Signaled,
                };
                Ok(RunOutput {
                    status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    duration: started.elapsed(),
                })
            }
            Ok(Err(err)) => Err(GenerationError::Spawn {
                program: invocation.name.clone(),
                message: err.to_string(),
            }),
            Err(_) => {
                warn!(
                    program = %invocation.name,
                    limit_ms = invocation.time_limit.as_millis() as u64,
                    "Program exceeded time limit"
                );
                Ok(RunOutput {
                    status: ExitState::TimedOut,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    duration: started.elapsed(),
                })
            }
        }
    }
}
