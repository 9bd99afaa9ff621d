//! Configuration for fieldprice.
//!
//! This crate loads and saves `.fieldprice/config.yaml`, layering
//! environment overrides on top, and discovers the `.fieldprice/` directory
//! by walking up the filesystem.

pub mod config;
pub mod config_dir;

pub use config::{load_config, save_config, ConfigError, FieldPriceConfig, Result};
pub use config_dir::find_config_dir;
