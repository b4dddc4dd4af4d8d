//! Configuration management for the table generator

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use iprange::{Normalizer, OverlapPolicy};
use serde::Deserialize;

use crate::emit::OutputFormat;
use crate::source::SourceFormat;

mod error;

pub use error::CnlistConfigError;

/// Trait for validating configuration values.
trait Validatable {
    /// Validate the configuration values.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Top-level configuration for the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Where records come from and which of them to keep
    pub source: SourceConfig,
    /// How records are folded into intervals
    pub normalize: NormalizeConfig,
    /// Where the table goes
    pub output: OutputConfig,
}

/// Input feed settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// The layout of the feed
    pub format: SourceFormat,
    /// The country whose ranges are kept
    pub country: String,
    /// The feed to read; stdin when unset
    pub path: Option<PathBuf>,
}

impl Validatable for SourceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.country.len() != 2 || !self.country.bytes().all(|b| b.is_ascii_alphabetic()) {
            let err = CnlistConfigError::InvalidCountryCode(self.country.clone());
            return Err(ConfigError::Message(err.to_string()));
        }
        Ok(())
    }
}

/// Normalization settings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NormalizeConfig {
    /// Merge overlapping and adjacent ranges instead of rejecting overlaps
    pub merge: bool,
}

/// Output settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// The shape of the generated table
    pub format: OutputFormat,
    /// The file to write; stdout when unset
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Initializing the global config first with default values and then
    /// with provided/overwritten environment variables. The explicit
    /// separator with double underscores is needed to correctly parse the
    /// nested config structure.
    ///
    /// ```text
    /// CNLIST_SOURCE__COUNTRY
    /// ^^^^^^ ^^^^^^  ^^^^^^^
    ///    │  ^   │  ^^    └ The `country` field of the `source` object
    ///    │  │   │  └ separator("__")
    ///    │  │   └ The `source` field of the root object (`Settings`)
    ///    │  └ prefix_separator("_")
    ///    └ with_prefix("CNLIST")
    /// ```
    pub fn new(config_path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix("CNLIST")
            .separator("__")
            .try_parsing(true)
            .prefix_separator("_");

        let mut cfg_builder = Config::builder();

        cfg_builder = cfg_builder.set_default("source.format", "csv")?;
        cfg_builder = cfg_builder.set_default("source.country", "CN")?;
        cfg_builder = cfg_builder.set_default("normalize.merge", true)?;
        cfg_builder = cfg_builder.set_default("output.format", "rust")?;

        if let Some(path) = config_path {
            cfg_builder = cfg_builder.add_source(File::from(path.as_ref()));
        }
        cfg_builder = cfg_builder.add_source(env);

        let cfg = cfg_builder.build()?;

        let settings: Settings = cfg.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Perform validation on the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate()?;

        Ok(())
    }

    /// The normalizer described by these settings. Feeds tag records with
    /// upper-case codes, so the target is upper-cased here.
    pub fn normalizer(&self) -> Normalizer {
        let overlap = match self.normalize.merge {
            true => OverlapPolicy::Merge,
            false => OverlapPolicy::Preserve,
        };
        Normalizer::new()
            .with_country(self.source.country.to_ascii_uppercase())
            .with_overlap_policy(overlap)
    }
}
