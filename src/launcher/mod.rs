//! Invocation launcher.
//!
//! Locates the installation from the launcher's own path, exports the
//! interpreter variables to the child only, and runs the voice cloning
//! script inside the named conda environment with the caller's arguments
//! forwarded verbatim.

mod invoke;
mod root;

pub use invoke::{LaunchEnv, LaunchError, Launcher};
pub use root::{InstallRoot, RootError};

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::config::Settings;
use crate::process::{ProcessRunner, Runner};

/// Launch from the running executable with real child processes.
pub fn launch<I, S>(args: I) -> Result<i32, LaunchError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let root = InstallRoot::from_current_exe()?;
    run_from_root(ProcessRunner, root, args)
}

/// Launch as if the launcher lived at `launcher_path`.
///
/// Resolution happens before anything is run: a launcher path that cannot
/// be resolved never reaches the runner.
pub fn launch_from<R, I, S>(launcher_path: &Path, runner: R, args: I) -> Result<i32, LaunchError>
where
    R: Runner,
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let root = InstallRoot::from_launcher_path(launcher_path)?;
    run_from_root(runner, root, args)
}

fn run_from_root<R, I, S>(runner: R, root: InstallRoot, args: I) -> Result<i32, LaunchError>
where
    R: Runner,
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    debug!(root = %root.path().display(), "Resolved installation root");
    let settings = Settings::load(root.path())?;
    Launcher::new(runner, root, settings).invoke(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{MockRunner, RunError};
    use std::ffi::OsStr;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Lay out `<tmp>/install/{bin/voice-clone,src}` and return the canonical root.
    fn install_layout(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
        let root = temp_dir.path().join("install");
        std::fs::create_dir_all(root.join("bin")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        let launcher = root.join("bin").join("voice-clone");
        std::fs::write(&launcher, b"").unwrap();
        (std::fs::canonicalize(&root).unwrap(), launcher)
    }

    fn launcher_for(root: &Path, runner: MockRunner) -> Launcher<MockRunner> {
        Launcher::new(runner, InstallRoot::from_dir(root), Settings::default())
    }

    // ===========================================
    // resolve_root
    // ===========================================

    #[test]
    fn test_root_is_two_levels_above_launcher() {
        let temp_dir = TempDir::new().unwrap();
        let (root, launcher) = install_layout(&temp_dir);

        let resolved = InstallRoot::from_launcher_path(&launcher).unwrap();

        assert_eq!(resolved.path(), root);
    }

    #[cfg(unix)]
    #[test]
    fn test_root_follows_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let (root, launcher) = install_layout(&temp_dir);

        let elsewhere = temp_dir.path().join("elsewhere").join("deep");
        std::fs::create_dir_all(&elsewhere).unwrap();
        let link = elsewhere.join("voice-clone");
        std::os::unix::fs::symlink(&launcher, &link).unwrap();

        let resolved = InstallRoot::from_launcher_path(&link).unwrap();

        assert_eq!(resolved.path(), root);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_unresolvable() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("voice-clone");
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), &link).unwrap();

        let result = InstallRoot::from_launcher_path(&link);

        assert!(matches!(result, Err(RootError::Unresolvable { .. })));
    }

    #[test]
    fn test_missing_launcher_is_unresolvable() {
        let result = InstallRoot::from_launcher_path(Path::new("/nonexistent/bin/voice-clone"));

        assert!(matches!(result, Err(RootError::Unresolvable { .. })));
    }

    // ===========================================
    // prepare_environment
    // ===========================================

    #[test]
    fn test_prepare_environment_values() {
        let launcher = launcher_for(Path::new("/opt/f5"), MockRunner::new());
        let env = launcher.prepare_environment();

        assert_eq!(env.vars().len(), 4);
        assert_eq!(env.get("PYTHONDONTWRITEBYTECODE"), Some(OsStr::new("1")));
        assert_eq!(env.get("PYTHONUNBUFFERED"), Some(OsStr::new("1")));
        assert_eq!(
            env.get("PYTHONPATH"),
            Some(PathBuf::from("/opt/f5/src").as_os_str())
        );
        assert_eq!(env.get("PYTHONWARNINGS"), Some(OsStr::new("ignore")));
    }

    #[test]
    fn test_prepare_environment_does_not_touch_own_process() {
        let before = std::env::var_os("PYTHONWARNINGS");
        let mut runner = MockRunner::new();
        runner.expect_run().times(1).returning(|_| Ok(0));

        launcher_for(Path::new("/opt/f5"), runner)
            .invoke(["--text", "Hello"])
            .unwrap();

        assert_eq!(std::env::var_os("PYTHONWARNINGS"), before);
    }

    // ===========================================
    // invoke
    // ===========================================

    #[test]
    fn test_invoke_forwards_args_verbatim() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|cmd| {
                cmd.program == PathBuf::from("conda")
                    && cmd.args
                        == vec![
                            OsString::from("run"),
                            OsString::from("--no-capture-output"),
                            OsString::from("-n"),
                            OsString::from("f5-tts"),
                            OsString::from("python"),
                            PathBuf::from("/opt/f5/src/voice_clone.py").into_os_string(),
                            OsString::from("--ref_audio"),
                            OsString::from("work/origin.wav"),
                            OsString::from("--text"),
                            OsString::from("Hello"),
                        ]
            })
            .times(1)
            .returning(|_| Ok(0));

        let code = launcher_for(Path::new("/opt/f5"), runner)
            .invoke(["--ref_audio", "work/origin.wav", "--text", "Hello"])
            .unwrap();

        assert_eq!(code, 0);
    }

    #[test]
    fn test_invoke_does_not_interpret_odd_args() {
        let forwarded = ["--help", "", "  spaced  text ", "--", "-n", "other-env"];

        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(move |cmd| cmd.args[6..] == forwarded.map(OsString::from))
            .times(1)
            .returning(|_| Ok(0));

        launcher_for(Path::new("/opt/f5"), runner)
            .invoke(forwarded)
            .unwrap();
    }

    #[test]
    fn test_invoke_exports_env_on_child() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|cmd| {
                cmd.env_value("PYTHONDONTWRITEBYTECODE") == Some(OsStr::new("1"))
                    && cmd.env_value("PYTHONUNBUFFERED") == Some(OsStr::new("1"))
                    && cmd.env_value("PYTHONWARNINGS") == Some(OsStr::new("ignore"))
                    && cmd.env_value("PYTHONPATH")
                        == Some(PathBuf::from("/opt/f5/src").as_os_str())
            })
            .times(1)
            .returning(|_| Ok(0));

        launcher_for(Path::new("/opt/f5"), runner)
            .invoke(Vec::<OsString>::new())
            .unwrap();
    }

    #[test]
    fn test_invoke_propagates_exit_code() {
        for expected in [0, 1, 2, 42, 130, 255] {
            let mut runner = MockRunner::new();
            runner.expect_run().times(1).returning(move |_| Ok(expected));

            let code = launcher_for(Path::new("/opt/f5"), runner)
                .invoke(["--text", "Hello"])
                .unwrap();

            assert_eq!(code, expected);
        }
    }

    #[test]
    fn test_invoke_missing_conda() {
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|cmd| Err(RunError::NotFound(cmd.program_name())));

        let err = launcher_for(Path::new("/opt/f5"), runner)
            .invoke(["--text", "Hello"])
            .unwrap_err();

        assert!(matches!(err, LaunchError::Run(RunError::NotFound(_))));
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn test_invoke_uses_configured_env_name() {
        let settings = Settings {
            env_name: "f5-dev".to_string(),
            conda: PathBuf::from("/opt/conda/bin/conda"),
            ..Settings::default()
        };

        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|cmd| {
                cmd.program == PathBuf::from("/opt/conda/bin/conda") && cmd.args[3] == "f5-dev"
            })
            .times(1)
            .returning(|_| Ok(0));

        Launcher::new(runner, InstallRoot::from_dir("/opt/f5"), settings)
            .invoke(["--text", "Hello"])
            .unwrap();
    }

    // ===========================================
    // launch_from
    // ===========================================

    #[test]
    fn test_launch_from_resolves_and_invokes() {
        let temp_dir = TempDir::new().unwrap();
        let (root, launcher) = install_layout(&temp_dir);
        let expected_script = root.join("src").join("voice_clone.py");

        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(move |cmd| cmd.args[5] == expected_script.as_os_str())
            .times(1)
            .returning(|_| Ok(3));

        let code = launch_from(&launcher, runner, ["--text", "Hello"]).unwrap();

        assert_eq!(code, 3);
    }

    #[test]
    fn test_launch_from_unresolvable_never_runs() {
        // No expectations: any call to run() panics.
        let runner = MockRunner::new();

        let err = launch_from(
            Path::new("/nonexistent/bin/voice-clone"),
            runner,
            ["--text", "Hello"],
        )
        .unwrap_err();

        assert!(matches!(err, LaunchError::Root(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
