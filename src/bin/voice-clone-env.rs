//! voice-clone-env entry point.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use f5_clone_rs::cli::{Args, Command};
use f5_clone_rs::config::Settings;
use f5_clone_rs::environment::{DEFAULT_SHELL, EnvError, EnvManager};
use f5_clone_rs::launcher::InstallRoot;
use f5_clone_rs::logging;
use f5_clone_rs::process::ProcessRunner;

fn main() {
    let args = Args::parse();
    logging::init(if args.verbose { "debug" } else { "info" });

    if let Err(e) = run(args) {
        eprintln!("voice-clone-env: {e:#}");
        let code = e.downcast_ref::<EnvError>().map_or(1, EnvError::exit_code);
        process::exit(code);
    }
}

fn run(args: Args) -> Result<()> {
    let root = match &args.root {
        Some(dir) => InstallRoot::from_dir(
            dir.canonicalize()
                .with_context(|| format!("Installation root not found: {}", dir.display()))?,
        ),
        None => InstallRoot::from_current_exe().context("Failed to locate installation root")?,
    };

    let settings = Settings::load(root.path()).context("Failed to load settings")?;
    let shell = std::env::var_os("SHELL")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SHELL));
    let manager = EnvManager::new(ProcessRunner, root, settings).with_shell(shell);

    if let Command::Info { json } = args.command {
        print_summary(&manager, json)?;
        // Keep stdout parseable.
        if json {
            return Ok(());
        }
    }

    manager.execute(args.command.operation())?;
    Ok(())
}

fn print_summary(manager: &EnvManager<ProcessRunner>, json: bool) -> Result<()> {
    let summary = manager.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Installation root: {}", summary.root.display());
    println!("  Environment: {}", summary.env_name);
    println!("  Conda: {}", summary.conda.display());
    println!("  Entry point: {}", summary.entry_point.display());
    println!("  Module path: {}", summary.module_path.display());
    println!("  Packages: {}", summary.packages.join(" "));
    println!("  Channels: {}", summary.channels.join(" "));

    Ok(())
}
