//! Layered interpreter configuration
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `bbeat.toml` in the working directory (optional), or an explicit file
//!    given with [`ConfigBuilder::config_path`] (required)
//! 3. `BBEAT_*` environment variables, e.g. `BBEAT_MAX_CALL_DEPTH=64`
//! 4. Explicit overrides set on the builder (CLI flags)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "bbeat";
pub const ENV_PREFIX: &str = "BBEAT";
/// Each nested call costs several native frames; 100 levels fit in the 2 MiB
/// stack of a spawned thread.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}

/// How verbose snapshots are rendered
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Publish environment snapshots before, during and after the run
    pub verbose: bool,
    pub snapshot_format: SnapshotFormat,
    /// Nested function invocations allowed before the run is aborted
    pub max_call_depth: usize,
    /// Whether `if` chains may appear inside function bodies
    pub conditionals_in_functions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            snapshot_format: SnapshotFormat::Text,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            conditionals_in_functions: true,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    verbose: Option<bool>,
    snapshot_format: Option<SnapshotFormat>,
    max_call_depth: Option<usize>,
    conditionals_in_functions: Option<bool>,
    skip_environment: bool,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn verbose(mut self, verbose: Option<bool>) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn snapshot_format(mut self, format: Option<SnapshotFormat>) -> Self {
        self.snapshot_format = format;
        self
    }

    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn conditionals_in_functions(mut self, allowed: Option<bool>) -> Self {
        self.conditionals_in_functions = allowed;
        self
    }

    /// Ignore `BBEAT_*` environment variables
    pub fn skip_environment(mut self) -> Self {
        self.skip_environment = true;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let mut builder = ::config::Config::builder()
            .set_default("verbose", defaults.verbose)?
            .set_default("snapshot_format", "text")?
            .set_default("max_call_depth", defaults.max_call_depth as u64)?
            .set_default(
                "conditionals_in_functions",
                defaults.conditionals_in_functions,
            )?;

        builder = match &self.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.clone()));
                }
                builder.add_source(::config::File::from(path.as_path()).required(true))
            }
            None => builder.add_source(::config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        if !self.skip_environment {
            builder = builder
                .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        }

        let snapshot_format = self.snapshot_format.map(|format| match format {
            SnapshotFormat::Text => "text",
            SnapshotFormat::Json => "json",
        });

        let settings = builder
            .set_override_option("verbose", self.verbose)?
            .set_override_option("snapshot_format", snapshot_format)?
            .set_override_option("max_call_depth", self.max_call_depth.map(|d| d as u64))?
            .set_override_option("conditionals_in_functions", self.conditionals_in_functions)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::builder()
            .config_path(None)
            .skip_environment()
            .build()
            .unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "verbose = true").unwrap();
        writeln!(file, "snapshot_format = \"json\"").unwrap();
        writeln!(file, "max_call_depth = 8").unwrap();

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .max_call_depth(Some(3))
            .skip_environment()
            .build()
            .unwrap();

        assert!(config.verbose);
        assert_eq!(config.snapshot_format, SnapshotFormat::Json);
        assert_eq!(config.max_call_depth, 3);
        assert!(config.conditionals_in_functions);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::builder()
            .config_path(Some(PathBuf::from("/definitely/not/here/bbeat.toml")))
            .skip_environment()
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
