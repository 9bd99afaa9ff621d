//! Discovery of the `.fieldprice/` directory.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// The name of the configuration directory.
pub const CONFIG_DIR_NAME: &str = ".fieldprice";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "FIELDPRICE_DIR";

/// Walk up the directory tree from `start` looking for `.fieldprice/`.
///
/// `FIELDPRICE_DIR` is checked first and wins when it names a directory.
/// Returns `None` if the filesystem root is reached without finding one.
pub fn find_config_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    walk_up(start)
}

/// Like [`find_config_dir`], but a missing directory is an error.
pub fn find_config_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_config_dir(start).ok_or(ConfigError::ConfigDirNotFound)
}

fn walk_up(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        let candidate = current.join(CONFIG_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return None,
        }
    }
}
