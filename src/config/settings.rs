//! Launcher and environment settings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the optional settings file at the installation root.
pub const CONFIG_FILE: &str = "voice-clone.json";

/// Overrides the environment name.
pub const ENV_NAME_VAR: &str = "VOICE_CLONE_ENV";

/// Overrides the conda executable.
pub const CONDA_VAR: &str = "VOICE_CLONE_CONDA";

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment name: {0}")]
    InvalidEnvName(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Versions pinned when the environment is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinnedPackages {
    pub python: String,
    pub poetry: String,
    pub ffmpeg: String,
    pub cuda_toolkit: String,
}

impl Default for PinnedPackages {
    fn default() -> Self {
        Self {
            python: "3.11".to_string(),
            poetry: "1.8".to_string(),
            ffmpeg: "6.1".to_string(),
            cuda_toolkit: "12.1".to_string(),
        }
    }
}

impl PinnedPackages {
    /// Conda match specs, e.g. `python=3.11`.
    pub fn specs(&self) -> Vec<String> {
        vec![
            format!("python={}", self.python),
            format!("poetry={}", self.poetry),
            format!("ffmpeg={}", self.ffmpeg),
            format!("cuda-toolkit={}", self.cuda_toolkit),
        ]
    }
}

/// Everything the launcher and manager need besides the installation root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the managed conda environment.
    pub env_name: String,
    /// Conda executable (looked up on PATH when not absolute).
    pub conda: PathBuf,
    /// Interpreter run inside the environment.
    pub interpreter: String,
    /// Module search path, relative to the root.
    pub source_dir: PathBuf,
    /// External entry-point script, relative to the root.
    pub entry_point: PathBuf,
    pub packages: PinnedPackages,
    pub channels: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env_name: "f5-tts".to_string(),
            conda: PathBuf::from("conda"),
            interpreter: "python".to_string(),
            source_dir: PathBuf::from("src"),
            entry_point: PathBuf::from("src/voice_clone.py"),
            packages: PinnedPackages::default(),
            channels: vec!["conda-forge".to_string(), "nvidia".to_string()],
        }
    }
}

impl Settings {
    /// Load settings for an installation root.
    ///
    /// Defaults, then `<root>/voice-clone.json` if present, then the
    /// `VOICE_CLONE_*` process variables.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_with(root, |key| std::env::var_os(key))
    }

    /// Load with a custom variable lookup.
    pub fn load_with<F>(root: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let path = root.join(CONFIG_FILE);

        let settings = match std::fs::read_to_string(&path) {
            Ok(json) => {
                debug!(path = %path.display(), "Read settings file");
                serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let settings = settings.with_overrides(lookup)?;
        Self::validate_env_name(&settings.env_name)?;

        Ok(settings)
    }

    /// Apply `VOICE_CLONE_ENV` and `VOICE_CLONE_CONDA` overrides.
    ///
    /// Empty values are treated as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(name) = lookup(ENV_NAME_VAR).filter(|v| !v.is_empty()) {
            self.env_name = name.into_string().map_err(|raw| {
                ConfigError::InvalidEnvName(format!("{raw:?} is not valid UTF-8"))
            })?;
        }
        if let Some(conda) = lookup(CONDA_VAR).filter(|v| !v.is_empty()) {
            self.conda = PathBuf::from(conda);
        }
        Ok(self)
    }

    fn validate_env_name(name: &str) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::InvalidEnvName(
                "Name cannot be empty".to_string(),
            ));
        }

        if name.chars().any(char::is_whitespace)
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(ConfigError::InvalidEnvName(format!(
                "'{name}' cannot contain whitespace or path separators"
            )));
        }

        Ok(())
    }
}
