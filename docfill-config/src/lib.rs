//! Configuration for docfill tools.
//!
//! Every setting has a value in `defaults/docfill.default.toml`, compiled into the crate.
//! [`Loader`] stacks TOML files and `key=value` overrides on top of it and checks the merge
//! settings before handing out a [`DocfillConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docfill::MergeOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/docfill.default.toml");

/// Top-level configuration consumed by docfill applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocfillConfig {
    pub merge: MergeConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Mirrors the knobs exposed by the merge engine.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    pub max_replacements_per_token: usize,
    pub emu_per_pixel: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl From<&MergeConfig> for MergeOptions {
    fn from(config: &MergeConfig) -> Self {
        MergeOptions {
            max_replacements_per_token: config.max_replacements_per_token,
            emu_per_pixel: config.emu_per_pixel,
        }
    }
}

/// Builds a [`DocfillConfig`] from the embedded defaults plus caller-supplied layers.
///
/// Later layers win: files in the order they were added, then key overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder()
                .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Layer a TOML file, skipping it when absent.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override a single dotted key, e.g. `merge.emu_per_pixel`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Override from a `key=value` assignment. Integers and booleans are typed, anything else
    /// is kept as a string.
    pub fn with_assignment(self, assignment: &str) -> Result<Self, ConfigError> {
        let (key, raw) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| {
                ConfigError::Message(format!("expected key=value, got '{}'", assignment))
            })?;

        if let Ok(number) = raw.parse::<i64>() {
            self.set_override(key, number)
        } else if let Ok(flag) = raw.parse::<bool>() {
            self.set_override(key, flag)
        } else {
            self.set_override(key, raw)
        }
    }

    /// Merge every layer, deserialize and check the values the engine cannot work with.
    pub fn build(self) -> Result<DocfillConfig, ConfigError> {
        let config: DocfillConfig = self.builder.build()?.try_deserialize()?;
        config.merge.validate()?;
        Ok(config)
    }
}

impl MergeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_replacements_per_token == 0 {
            return Err(ConfigError::Message(
                "merge.max_replacements_per_token must be at least 1".to_string(),
            ));
        }
        if self.emu_per_pixel <= 0 {
            return Err(ConfigError::Message(
                "merge.emu_per_pixel must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Defaults only, no user layers.
pub fn load_defaults() -> Result<DocfillConfig, ConfigError> {
    Loader::new().build()
}
