// src/config/loader.rs
//! Layered configuration loader
//!
//! Sources are merged in order: built-in defaults, each TOML file that exists
//! (later files win), then environment variables such as
//! `BREATH_APNEA_MIN_SEC=15`. Missing files are skipped.

use crate::config::{constants::paths, PipelineConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("configuration serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds a [`PipelineConfig`] from files and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Loader over the default file locations and the `BREATH_` environment prefix
    pub fn new() -> Self {
        Self {
            config_paths: paths::DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).collect(),
            env_prefix: Some(paths::ENV_PREFIX.to_string()),
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            ..Self::new()
        }
    }

    /// Read overrides from variables named `<PREFIX>_<FIELD>`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignore the environment entirely
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Merge every layer into a configuration
    pub fn load(&self) -> Result<PipelineConfig, ConfigError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&PipelineConfig::default())?);

        for path in &self.config_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration file");
            }
            builder = builder.add_source(
                ::config::File::from(path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(::config::Environment::with_prefix(prefix).try_parsing(true));
        }

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        log_adjustments(&config);
        Ok(config)
    }

    /// Parse a single TOML document over the defaults
    pub fn from_toml_str(content: &str) -> Result<PipelineConfig, ConfigError> {
        let config: PipelineConfig = ::config::Config::builder()
            .add_source(::config::Config::try_from(&PipelineConfig::default())?)
            .add_source(::config::File::from_str(content, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        log_adjustments(&config);
        Ok(config)
    }

    /// Write a configuration to a TOML file
    pub fn export<P: AsRef<Path>>(config: &PipelineConfig, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn log_adjustments(config: &PipelineConfig) {
    for note in config.adjustments() {
        tracing::warn!(adjustment = %note, "configuration value out of range, clamping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::AdcGain;

    #[test]
    fn test_from_toml_str_overrides() {
        let config = ConfigLoader::from_toml_str(
            r#"
            processing_rate_hz = 50
            adc_gain = "eight"
            hypopnea_frac = 0.4
            "#,
        )
        .unwrap();

        assert_eq!(config.processing_rate_hz, 50);
        assert_eq!(config.adc_gain, AdcGain::Eight);
        assert_eq!(config.hypopnea_frac, 0.4);
        assert_eq!(config.apnea_min_sec, PipelineConfig::default().apnea_min_sec);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(ConfigLoader::from_toml_str("processing_rate_hz = [").is_err());
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/breath.toml")]).without_env();
        let config = loader.load().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_out_of_range_values_are_kept_for_clamping() {
        let config = ConfigLoader::from_toml_str("anti_ring_taps = 0").unwrap();
        assert_eq!(config.anti_ring_taps, 0);
        assert_eq!(config.sanitized().anti_ring_taps, 1);
    }
}
