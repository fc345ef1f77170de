//! Runtime configuration for `flock`.
//!
//! Settings come from an optional TOML file; command-line flags override
//! them per invocation.
//!
//! ```toml
//! [table]
//! page_size_options = [5, 10, 25]
//! strictness = "strict"
//!
//! [table.initial]
//! page_size = 5
//!
//! [staging]
//! max_size = 10485760
//! accept = ".pdf,image/*"
//! max_files = 20
//!
//! [display]
//! max_width = 30
//! ```

use std::path::Path;

use anyhow::Context;
use flock_staging::config::StagingConfig;
use flock_table::state::TableOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{Cli, StageArgs};

/// Default widest text column.
pub const DEFAULT_MAX_WIDTH: usize = 24;

/// Runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page sizes, strictness and initial state for listings.
    pub table: TableOptions,

    /// Upload limits.
    pub staging: StagingConfig,

    /// Text output settings.
    pub display: DisplayConfig,
}

/// Text output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Loads the file named on the command line, or falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be loaded.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        match &cli.config {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Staging limits with the command's flags applied on top.
    #[must_use]
    pub fn staging_for(&self, args: &StageArgs) -> StagingConfig {
        let mut staging = self.staging.clone();
        if let Some(max) = args.max_size {
            staging = staging.max_size(max);
        }
        if let Some(accept) = &args.accept {
            staging = staging.accept(accept.clone());
        }
        if args.single {
            staging = staging.multiple(false);
        }
        if let Some(max) = args.max_files {
            staging = staging.max_files(max);
        }
        staging
    }
}
