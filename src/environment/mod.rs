//! Environment manager.
//!
//! Each operation is a single delegated conda command; they share nothing
//! but the environment name.

mod manager;

pub use manager::{DEFAULT_SHELL, EnvError, EnvManager, EnvOperation, EnvSummary};
