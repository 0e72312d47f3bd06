//! voice-clone entry point.
//!
//! Every argument is forwarded to the voice cloning script; none are parsed
//! here.

use std::process;

use f5_clone_rs::launcher;
use f5_clone_rs::logging;

fn main() {
    logging::init("warn");

    let code = match launcher::launch(std::env::args_os().skip(1)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("voice-clone: {e}");
            e.exit_code()
        }
    };

    process::exit(code);
}
