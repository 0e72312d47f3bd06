//! Installation root discovery.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while locating the installation root.
#[derive(Error, Debug)]
pub enum RootError {
    #[error("Cannot locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("Cannot resolve launcher path {path}: {source}")]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Launcher path has no installation root above it: {0}")]
    NoParent(PathBuf),
}

/// Top-level directory of an installation: `<root>/bin/<launcher>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot(PathBuf);

impl InstallRoot {
    /// Resolve the root from the running executable.
    pub fn from_current_exe() -> Result<Self, RootError> {
        let exe = std::env::current_exe().map_err(RootError::CurrentExe)?;
        Self::from_launcher_path(&exe)
    }

    /// Resolve the root from a launcher path.
    ///
    /// Symlinks are followed, so a link to the launcher placed anywhere
    /// still finds the real installation.
    pub fn from_launcher_path(path: &Path) -> Result<Self, RootError> {
        let resolved = std::fs::canonicalize(path).map_err(|source| RootError::Unresolvable {
            path: path.to_path_buf(),
            source,
        })?;

        let root = resolved
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| RootError::NoParent(resolved.clone()))?;

        Ok(Self(root.to_path_buf()))
    }

    /// Wrap an already known root directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Join a root-relative path.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}
