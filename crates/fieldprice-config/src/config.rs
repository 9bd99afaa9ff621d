//! Configuration types and loading.
//!
//! The main entry point is [`FieldPriceConfig`], the contents of
//! `.fieldprice/config.yaml`. Values are layered: built-in defaults, then the
//! YAML file, then `FIELDPRICE_*` environment variables (sections separated
//! by a double underscore, e.g. `FIELDPRICE_VALIDATION__ZERO_PROBE=1`).

use std::path::Path;

use fieldprice_engine::{PricingOptions, ValidationOptions};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.yaml";

const ENV_PREFIX: &str = "FIELDPRICE_";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized to YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A layer contained a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("no .fieldprice directory found")]
    ConfigDirNotFound,
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// `validation` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidationConfig {
    /// Bound to `value` during the numeric-result check.
    pub numeric_probe: f64,
    /// Bound to `value` during the division-by-zero check.
    pub zero_probe: f64,
    /// Report every error per field instead of the first.
    pub collect_all: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let options = ValidationOptions::default();
        Self {
            numeric_probe: options.numeric_probe,
            zero_probe: options.zero_probe,
            collect_all: options.collect_all,
        }
    }
}

/// `pricing` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PricingConfig {
    pub allow_constant_defaults: bool,
    pub require_base_price: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let options = PricingOptions::default();
        Self {
            allow_constant_defaults: options.allow_constant_defaults,
            require_base_price: options.require_base_price,
        }
    }
}

/// The full configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPriceConfig {
    pub validation: ValidationConfig,
    pub pricing: PricingConfig,
}

impl FieldPriceConfig {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            numeric_probe: self.validation.numeric_probe,
            zero_probe: self.validation.zero_probe,
            collect_all: self.validation.collect_all,
        }
    }

    pub fn pricing_options(&self) -> PricingOptions {
        PricingOptions {
            allow_constant_defaults: self.pricing.allow_constant_defaults,
            require_base_price: self.pricing.require_base_price,
        }
    }
}

/// Load configuration from `config.yaml` inside `config_dir`, with
/// environment overrides.
///
/// A missing or empty file yields the defaults (plus any environment
/// overrides).
pub fn load_config(config_dir: &Path) -> Result<FieldPriceConfig> {
    load_layered(config_dir, ENV_PREFIX)
}

fn load_layered(config_dir: &Path, env_prefix: &str) -> Result<FieldPriceConfig> {
    let mut figment = Figment::from(Serialized::defaults(FieldPriceConfig::default()));

    let config_path = config_dir.join(CONFIG_FILE);
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        // An empty file is valid and yields default config.
        if !content.trim().is_empty() {
            figment = figment.merge(Yaml::string(&content));
        }
    }

    // FIELDPRICE_PRICING__REQUIRE_BASE_PRICE -> pricing.require-base-price
    let env = Env::prefixed(env_prefix)
        .map(|key| key.as_str().replace("__", ".").replace('_', "-").into());
    figment.merge(env).extract().map_err(Box::new).map_err(ConfigError::from)
}

/// Save configuration to `config.yaml` inside `config_dir`, creating the
/// directory if needed.
pub fn save_config(config_dir: &Path, config: &FieldPriceConfig) -> Result<()> {
    std::fs::create_dir_all(config_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(config_dir.join(CONFIG_FILE), yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let cfg = FieldPriceConfig::default();
        assert_eq!(cfg.validation.numeric_probe, 10.0);
        assert_eq!(cfg.validation.zero_probe, 0.0);
        assert!(!cfg.validation.collect_all);
        assert!(cfg.pricing.allow_constant_defaults);
        assert!(!cfg.pricing.require_base_price);
        assert_eq!(cfg.validation_options(), ValidationOptions::default());
        assert_eq!(cfg.pricing_options(), PricingOptions::default());
    }

    #[test]
    fn missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_layered(dir.path(), "FIELDPRICE_TEST_MISSING_").unwrap();
        assert_eq!(cfg, FieldPriceConfig::default());
    }

    #[test]
    fn empty_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "  \n").unwrap();
        let cfg = load_layered(dir.path(), "FIELDPRICE_TEST_EMPTY_").unwrap();
        assert_eq!(cfg, FieldPriceConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "validation:\n  zero-probe: -1\npricing:\n  require-base-price: true\n";
        std::fs::write(dir.path().join(CONFIG_FILE), yaml).unwrap();

        let cfg = load_layered(dir.path(), "FIELDPRICE_TEST_PARTIAL_").unwrap();
        assert_eq!(cfg.validation.zero_probe, -1.0);
        assert_eq!(cfg.validation.numeric_probe, 10.0);
        assert!(cfg.pricing.require_base_price);
        assert!(cfg.pricing.allow_constant_defaults);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "validation:\n  collect-all: false\n",
        )
        .unwrap();

        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("FIELDPRICE_TEST_ENV_VALIDATION__COLLECT_ALL", "true");
        }
        let cfg = load_layered(dir.path(), "FIELDPRICE_TEST_ENV_").unwrap();
        assert!(cfg.validation.collect_all);
    }

    #[test]
    fn wrong_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "validation:\n  numeric-probe: lots\n",
        )
        .unwrap();
        assert!(matches!(
            load_layered(dir.path(), "FIELDPRICE_TEST_WRONG_"),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".fieldprice");
        let mut cfg = FieldPriceConfig::default();
        cfg.validation.numeric_probe = 3.0;
        cfg.pricing.allow_constant_defaults = false;

        save_config(&config_dir, &cfg).unwrap();
        let loaded = load_layered(&config_dir, "FIELDPRICE_TEST_ROUNDTRIP_").unwrap();
        assert_eq!(loaded, cfg);
    }
}
