//! CLI argument parsing for `voice-clone-env`.
//!
//! The launcher itself has no CLI of its own: every argument it receives
//! belongs to the voice cloning script.

mod args;

pub use args::{Args, Command};
