//! Bounded execution of external command-line tools
//!
//! Health checks delegate to tools such as `btcli`, `aws` and `nvidia-smi`
//! and only look at their exit status and captured output. Every invocation
//! carries a deadline; a child that outlives it is killed and reported as
//! [`ExecError::Timeout`].

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Errors raised while running an external tool
#[derive(Error, Debug)]
pub enum ExecError {
    /// The program is not installed or not on `PATH`
    #[error("'{program}' not found in PATH")]
    NotFound { program: String },

    /// The program did not finish before its deadline
    #[error("'{program}' timed out after {:.1}s", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    /// Spawning or waiting on the program failed
    #[error("Failed to run '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub type ExecResult<T> = Result<T, ExecError>;

/// A program invocation: executable, arguments and extra environment
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

// Environment values are usually credentials, so only keys are shown.
impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.envs.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env_keys", &env_keys)
            .finish()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and captured streams of a finished program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs external programs with a deadline
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion, giving up after `limit`
    async fn run(&self, command: &CommandSpec, limit: Duration) -> ExecResult<CommandOutput>;
}

/// Executor backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn run(&self, command: &CommandSpec, limit: Duration) -> ExecResult<CommandOutput> {
        debug!("Running `{}` with a {:?} deadline", command, limit);

        let child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&command.program, e))?;

        // Dropping the wait future on expiry drops the child, which kills it.
        match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let output = CommandOutput::from(output);
                debug!("`{}` exited with {:?}", command.program, output.status);
                Ok(output)
            }
            Ok(Err(e)) => Err(ExecError::Io {
                program: command.program.clone(),
                source: e,
            }),
            Err(_) => Err(ExecError::Timeout {
                program: command.program.clone(),
                timeout: limit,
            }),
        }
    }
}

fn spawn_error(program: &str, error: io::Error) -> ExecError {
    if error.kind() == io::ErrorKind::NotFound {
        ExecError::NotFound {
            program: program.to_string(),
        }
    } else {
        ExecError::Io {
            program: program.to_string(),
            source: error,
        }
    }
}
