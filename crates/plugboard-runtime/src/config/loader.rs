//! Configuration loader
//!
//! Merges runtime configuration from defaults, an optional TOML file, and
//! environment variables, in that order (later sources win).

use crate::config::RuntimeConfig;
use crate::constants::*;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use plugboard_domain::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `RuntimeConfig::default()`
    /// 2. TOML configuration file (if it exists)
    /// 3. Environment variables with prefix; nested keys use a double
    ///    underscore (e.g. `PLUGBOARD_LOGGING__LEVEL=debug`)
    pub fn load(&self) -> Result<RuntimeConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(RuntimeConfig::default()));

        if let Some(config_path) = &self.config_path {
            figment = figment.merge(Toml::file(config_path));
            log_config_loaded(config_path, config_path.exists());
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        let config: RuntimeConfig = figment
            .extract()
            .map_err(|err| Error::configuration_with_source("Failed to extract configuration", err))?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Reload configuration (useful for hot-reloading)
    pub fn reload(&self) -> Result<RuntimeConfig> {
        self.load()
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Look for the default config file in the current directory
    fn find_default_config_path() -> Option<PathBuf> {
        let candidate = env::current_dir().ok()?.join(DEFAULT_CONFIG_FILENAME);
        candidate.exists().then_some(candidate)
    }

    /// Reject configurations that cannot be acted on
    fn validate_config(&self, config: &RuntimeConfig) -> Result<()> {
        parse_log_level(&config.logging.level)?;
        if config.event_bus.capacity == 0 {
            return Err(Error::configuration(
                "event_bus.capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
