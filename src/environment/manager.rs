//! Conda environment lifecycle operations.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::launcher::InstallRoot;
use crate::process::{RunError, Runner, ToolCommand};

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Errors that can occur during environment management.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("{operation} failed: {program} exited with status {code}")]
    ToolFailed {
        operation: EnvOperation,
        program: String,
        code: i32,
    },

    #[error("{operation} failed: {source}")]
    Run {
        operation: EnvOperation,
        #[source]
        source: RunError,
    },
}

impl EnvError {
    /// Exit status the manager reports, matching the delegated tool's.
    pub fn exit_code(&self) -> i32 {
        match self {
            EnvError::ToolFailed { code, .. } => *code,
            EnvError::Run { source, .. } => source.exit_code(),
        }
    }
}

/// The management operations, each one delegated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvOperation {
    Create,
    InstallDependencies,
    Update,
    List,
    Remove,
    Shell,
    Info,
}

impl EnvOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvOperation::Create => "create",
            EnvOperation::InstallDependencies => "install",
            EnvOperation::Update => "update",
            EnvOperation::List => "list",
            EnvOperation::Remove => "remove",
            EnvOperation::Shell => "shell",
            EnvOperation::Info => "info",
        }
    }
}

impl fmt::Display for EnvOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local view of the installation, printed by `info`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnvSummary {
    pub root: PathBuf,
    pub env_name: String,
    pub conda: PathBuf,
    pub entry_point: PathBuf,
    pub module_path: PathBuf,
    pub packages: Vec<String>,
    pub channels: Vec<String>,
}

/// Manages the named runtime environment the launcher runs in.
pub struct EnvManager<R: Runner> {
    runner: R,
    root: InstallRoot,
    settings: Settings,
    shell: PathBuf,
}

impl<R: Runner> EnvManager<R> {
    /// Create a new manager. [`EnvManager::shell`] opens `/bin/sh` unless
    /// [`EnvManager::with_shell`] says otherwise.
    pub fn new(runner: R, root: InstallRoot, settings: Settings) -> Self {
        Self {
            runner,
            root,
            settings,
            shell: PathBuf::from(DEFAULT_SHELL),
        }
    }

    /// Use a specific shell for [`EnvManager::shell`].
    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Build the delegated command for an operation.
    pub fn command(&self, operation: EnvOperation) -> ToolCommand {
        let conda = ToolCommand::new(&self.settings.conda);
        let name = &self.settings.env_name;

        match operation {
            EnvOperation::Create => {
                let mut cmd = conda.args(["create", "-y", "-n"]).arg(name);
                for channel in &self.settings.channels {
                    cmd = cmd.arg("-c").arg(channel);
                }
                cmd.args(self.settings.packages.specs())
            }
            EnvOperation::InstallDependencies => self
                .in_env(conda)
                .args(["poetry", "install", "--no-root"]),
            EnvOperation::Update => self.in_env(conda).args(["poetry", "update"]),
            EnvOperation::List => self.in_env(conda).args(["poetry", "show"]),
            EnvOperation::Remove => conda.args(["env", "remove", "-y", "-n"]).arg(name),
            EnvOperation::Shell => self.in_env(conda).arg(&self.shell),
            EnvOperation::Info => conda.args(["env", "list"]),
        }
    }

    fn in_env(&self, conda: ToolCommand) -> ToolCommand {
        conda
            .args(["run", "--no-capture-output", "-n"])
            .arg(&self.settings.env_name)
            .current_dir(self.root.path())
    }

    /// Run one operation, surfacing a non-zero status unmodified.
    pub fn execute(&self, operation: EnvOperation) -> Result<(), EnvError> {
        let command = self.command(operation);
        info!(%operation, env = %self.settings.env_name, "Running environment operation");

        let code = self
            .runner
            .run(&command)
            .map_err(|source| EnvError::Run { operation, source })?;

        if code != 0 {
            warn!(%operation, code, "Environment tool failed");
            return Err(EnvError::ToolFailed {
                operation,
                program: command.program_name(),
                code,
            });
        }

        Ok(())
    }

    /// Provision the environment with the pinned toolchain.
    pub fn create(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::Create)
    }

    /// Install the locked dependencies without the root package.
    pub fn install_dependencies(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::InstallDependencies)
    }

    pub fn update(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::Update)
    }

    pub fn list(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::List)
    }

    /// Delete the environment and everything installed in it.
    pub fn remove(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::Remove)
    }

    /// Interactive shell inside the environment, rooted at the installation.
    pub fn shell(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::Shell)
    }

    /// List the environments conda knows about.
    pub fn info(&self) -> Result<(), EnvError> {
        self.execute(EnvOperation::Info)
    }

    pub fn summary(&self) -> EnvSummary {
        EnvSummary {
            root: self.root.path().to_path_buf(),
            env_name: self.settings.env_name.clone(),
            conda: self.settings.conda.clone(),
            entry_point: self.root.join(&self.settings.entry_point),
            module_path: self.root.join(&self.settings.source_dir),
            packages: self.settings.packages.specs(),
            channels: self.settings.channels.clone(),
        }
    }
}
