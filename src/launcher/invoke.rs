//! Child environment preparation and script invocation.

use std::ffi::{OsStr, OsString};

use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, Settings};
use crate::process::{RunError, Runner, ToolCommand};

use super::root::{InstallRoot, RootError};

/// Errors that abort a launch.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Installation root error: {0}")]
    Root(#[from] RootError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Launch failed: {0}")]
    Run(#[from] RunError),
}

impl LaunchError {
    /// Exit status the launcher reports for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Run(e) => e.exit_code(),
            LaunchError::Root(_) | LaunchError::Config(_) => 1,
        }
    }
}

/// Variables exported to the child for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnv {
    vars: Vec<(&'static str, OsString)>,
}

impl LaunchEnv {
    /// The four interpreter variables for an installation.
    pub fn for_root(root: &InstallRoot, settings: &Settings) -> Self {
        let vars = vec![
            ("PYTHONDONTWRITEBYTECODE", OsString::from("1")),
            ("PYTHONUNBUFFERED", OsString::from("1")),
            ("PYTHONPATH", root.join(&settings.source_dir).into_os_string()),
            ("PYTHONWARNINGS", OsString::from("ignore")),
        ];
        Self { vars }
    }

    pub fn vars(&self) -> &[(&'static str, OsString)] {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_os_str())
    }
}

/// Runs the external voice cloning script inside the named environment.
pub struct Launcher<R: Runner> {
    runner: R,
    root: InstallRoot,
    settings: Settings,
}

impl<R: Runner> Launcher<R> {
    /// Create a new launcher.
    pub fn new(runner: R, root: InstallRoot, settings: Settings) -> Self {
        Self {
            runner,
            root,
            settings,
        }
    }

    pub fn root(&self) -> &InstallRoot {
        &self.root
    }

    /// Child-scoped variables for this installation.
    pub fn prepare_environment(&self) -> LaunchEnv {
        LaunchEnv::for_root(&self.root, &self.settings)
    }

    /// Build the delegated command, forwarding `args` untouched.
    pub fn command<I, S>(&self, args: I) -> ToolCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let script = self.root.join(&self.settings.entry_point);

        let mut cmd = ToolCommand::new(&self.settings.conda)
            .args(["run", "--no-capture-output", "-n"])
            .arg(&self.settings.env_name)
            .arg(&self.settings.interpreter)
            .arg(script)
            .args(args);

        for (key, value) in self.prepare_environment().vars() {
            cmd = cmd.env(*key, value);
        }

        cmd
    }

    /// Run the script and return its exit code unchanged.
    pub fn invoke<I, S>(&self, args: I) -> Result<i32, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let command = self.command(args);
        debug!(
            root = %self.root.path().display(),
            env = %self.settings.env_name,
            "Invoking voice cloning script"
        );

        Ok(self.runner.run(&command)?)
    }
}
