//! f5-clone-rs: launcher and environment manager for F5-TTS voice cloning.
//!
//! The `voice-clone` binary runs the external voice cloning script inside a
//! named conda environment, forwarding its arguments and exit status
//! unchanged. The `voice-clone-env` binary manages that environment.

pub mod cli;
pub mod config;
pub mod environment;
pub mod launcher;
pub mod logging;
pub mod process;
