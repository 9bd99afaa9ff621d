//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command handler needs: global
//! flags and the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fieldprice_config::config_dir::CONFIG_DIR_NAME;
use fieldprice_config::{find_config_dir, load_config, FieldPriceConfig};
use fieldprice_engine::EventSnapshot;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit `--config-dir` (or `FIELDPRICE_DIR`).
    pub config_dir: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            config_dir: global.config_dir.clone(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The configuration directory: the explicit one, else `.fieldprice/`
    /// found by walking up from the current directory.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.config_dir {
            return Some(dir.clone());
        }
        let cwd = std::env::current_dir().ok()?;
        find_config_dir(&cwd)
    }

    /// Loads the configuration, falling back to defaults (plus environment
    /// overrides) when no configuration directory exists.
    pub fn load_config(&self) -> Result<FieldPriceConfig> {
        let dir = self
            .resolve_config_dir()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME));
        debug!(dir = %dir.display(), "loading configuration");
        load_config(&dir).with_context(|| format!("failed to load config from {}", dir.display()))
    }

    pub fn load_snapshot(&self, path: &Path) -> Result<EventSnapshot> {
        EventSnapshot::load(path)
            .with_context(|| format!("failed to load snapshot {}", path.display()))
    }
}
