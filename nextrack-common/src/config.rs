//! Configuration file loading
//!
//! Config path resolution follows the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Compiled default path (fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Resolve the configuration file path.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    default_path: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: Compiled default
    PathBuf::from(default_path)
}

/// Load and deserialize a TOML configuration file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Bad config file {}: {}", path.display(), e)))
}
