//! Child process execution.
//!
//! Every external tool this crate drives (conda, and the interpreter inside
//! the managed environment) is reached through the [`Runner`] trait,
//! allowing for mock implementations in tests.

mod command;
mod runner;

pub use command::ToolCommand;
pub use runner::{ProcessRunner, RunError, exit_code};

/// Trait for running an external tool to completion.
#[cfg_attr(test, mockall::automock)]
pub trait Runner {
    /// Run a command with inherited stdio and block until it exits.
    ///
    /// # Returns
    /// The child's exit code, unchanged.
    fn run(&self, command: &ToolCommand) -> Result<i32, RunError>;
}
