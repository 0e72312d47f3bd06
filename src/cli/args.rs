//! CLI argument definitions for the environment manager.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::environment::EnvOperation;

/// Manage the conda environment the voice cloning script runs in.
#[derive(Parser, Debug)]
#[command(name = "voice-clone-env")]
#[command(about = "Create, update, inspect and remove the voice cloning environment")]
#[command(version)]
pub struct Args {
    /// Installation root (default: two levels above this executable)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Environment operations.
#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create the environment with the pinned toolchain
    Create,

    /// Install project dependencies into the environment
    Install,

    /// Upgrade dependencies within their version constraints
    Update,

    /// Show installed dependencies and versions
    List,

    /// Delete the environment and everything in it
    Remove,

    /// Open a shell inside the environment at the installation root
    Shell,

    /// Show installation settings and known environments
    Info {
        /// Print the installation summary as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// The manager operation this subcommand delegates to.
    pub fn operation(&self) -> EnvOperation {
        match self {
            Command::Create => EnvOperation::Create,
            Command::Install => EnvOperation::InstallDependencies,
            Command::Update => EnvOperation::Update,
            Command::List => EnvOperation::List,
            Command::Remove => EnvOperation::Remove,
            Command::Shell => EnvOperation::Shell,
            Command::Info { .. } => EnvOperation::Info,
        }
    }
}
