//! Layered configuration loading: embedded defaults, optional user file,
//! then `CODELOOM__`-prefixed environment variables, highest priority last.

use crate::domain::error::{Error, Result};
use config::{Config as ConfigBuilder, Environment, FileFormat};
use std::path::{Path, PathBuf};
use validator::Validate;

use super::types::Config;

const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default.toml");

/// Returns the embedded default config TOML, mainly for tests that assert
/// on its shape.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

/// Loads [`Config`] from embedded defaults, an optional TOML file, and the
/// environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load using only the embedded defaults plus environment overrides.
    pub fn load(&self) -> Result<Config> {
        self.build(None)
    }

    /// Load with an additional user TOML file layered between the embedded
    /// defaults and the environment.
    pub fn load_with_file(&self, path: &Path) -> Result<Config> {
        self.build(Some(path))
    }

    fn build(&self, user_file: Option<&Path>) -> Result<Config> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml));

        if let Some(path) = Self::conventional_config_path() {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("CODELOOM").separator("__").try_parsing(true));

        let built = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build configuration: {e}")))?;

        let config: Config = built
            .try_deserialize()
            .map_err(|e| Error::config(format!("failed to deserialize configuration: {e}")))?;

        config
            .validate()
            .map_err(|e| Error::config(format!("configuration validation failed: {e}")))?;

        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/codeloom/config.toml` (or the platform equivalent),
    /// layered between the embedded defaults and an explicit `--config` file.
    fn conventional_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("codeloom").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_load_and_validate() {
        let config = ConfigLoader::new().load().unwrap();
        assert!(config.code_analysis.vector_dim > 0);
        assert_eq!(config.code_analysis.min_chunk_length, 30);
    }

    #[test]
    #[serial_test::serial]
    fn environment_overrides_take_precedence() {
        unsafe {
            std::env::set_var("CODELOOM__CODE_ANALYSIS__VECTOR_DIM", "768");
        }
        let config = ConfigLoader::new().load().unwrap();
        unsafe {
            std::env::remove_var("CODELOOM__CODE_ANALYSIS__VECTOR_DIM");
        }
        assert_eq!(config.code_analysis.vector_dim, 768);
    }
}
