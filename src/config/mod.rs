//! Settings shared by the launcher and the environment manager.

mod settings;

pub use settings::{
    CONDA_VAR, CONFIG_FILE, ConfigError, ENV_NAME_VAR, PinnedPackages, Settings,
};
