//! Blocking process runner with inherited stdio.

use std::io;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

use super::Runner;
use super::command::ToolCommand;

/// Errors that can occur when starting or waiting on a child process.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Program not found: {0}")]
    NotFound(String),

    #[error("Program is not executable: {0}")]
    PermissionDenied(String),

    #[error("Failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    fn from_spawn(program: String, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => RunError::NotFound(program),
            io::ErrorKind::PermissionDenied => RunError::PermissionDenied(program),
            _ => RunError::Io { program, source },
        }
    }

    /// Exit status a shell would report for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::NotFound(_) => 127,
            RunError::PermissionDenied(_) => 126,
            RunError::Io { .. } => 1,
        }
    }
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> Result<i32, RunError> {
        let mut cmd = command.to_command();
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!(?command, "Spawning child process");

        let mut child = cmd
            .spawn()
            .map_err(|e| RunError::from_spawn(command.program_name(), e))?;

        let status = child.wait().map_err(|source| RunError::Io {
            program: command.program_name(),
            source,
        })?;

        let code = exit_code(status);
        debug!(code, "Child process exited");

        Ok(code)
    }
}

/// Convert an exit status to the integer a shell would report.
///
/// A child terminated by a signal maps to `128 + signal` on Unix.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
