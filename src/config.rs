//! Configuration management for the PGN language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML configuration file
//!
//! Command-line flags win over the file, the file wins over built-in defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::core::DiagnosticProvider;
use crate::core::diagnostics::DEFAULT_SOURCE;
use crate::validation::{GrammarChecker, NoopChecker, StructureChecker};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments for the PGN language server
#[derive(Debug, Default, Parser)]
#[command(name = "pgn-ls")]
#[command(about = "Language server for PGN chess game files")]
#[command(version)]
pub struct Args {
    /// Configuration file to read instead of the default location
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Log level for the language server
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Only report lexical errors
    #[arg(
        long,
        help = "Disable structural checks (tag pairs, delimiters, results)"
    )]
    pub no_structure_checks: bool,

    /// Source tag attached to published diagnostics
    #[arg(long, help = "Source tag shown next to diagnostics")]
    pub diagnostic_source: Option<String>,
}

/// Errors loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk configuration (matches TOML)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub log_level: Option<String>,
    pub diagnostics: DiagnosticsSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsSection {
    pub source: Option<String>,
    pub structure_checks: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Log level
    pub log_level: String,
    /// Source tag on published diagnostics
    pub diagnostic_source: String,
    /// Run the structural checker after lexing
    pub structure_checks: bool,
    /// Configuration file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            diagnostic_source: DEFAULT_SOURCE.to_string(),
            structure_checks: true,
            config_path: None,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> anyhow::Result<Self> {
        Ok(Self::from_args(Args::parse())?)
    }

    /// Create configuration from explicit arguments, falling back to the
    /// default configuration file location
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        Self::resolve(args, default_config_path())
    }

    /// Create configuration from explicit arguments and fallback file
    ///
    /// An explicit `--config` must exist; a missing fallback file is ignored.
    pub fn resolve(args: Args, fallback: Option<PathBuf>) -> Result<Self, ConfigError> {
        let (file, config_path) = match (&args.config, fallback) {
            (Some(path), _) => (ConfigFile::load(path)?, Some(path.clone())),
            (None, Some(path)) => match ConfigFile::load(&path) {
                Ok(file) => (file, Some(path)),
                Err(ConfigError::NotFound(_)) => (ConfigFile::default(), None),
                Err(e) => return Err(e),
            },
            (None, None) => (ConfigFile::default(), None),
        };

        let defaults = Config::default();

        Ok(Config {
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            diagnostic_source: args
                .diagnostic_source
                .or(file.diagnostics.source)
                .unwrap_or(defaults.diagnostic_source),
            structure_checks: !args.no_structure_checks
                && file
                    .diagnostics
                    .structure_checks
                    .unwrap_or(defaults.structure_checks),
            config_path,
        })
    }

    /// Grammar checker selected by this configuration
    pub fn grammar_checker(&self) -> Arc<dyn GrammarChecker> {
        if self.structure_checks {
            Arc::new(StructureChecker)
        } else {
            Arc::new(NoopChecker)
        }
    }

    pub fn diagnostic_provider(&self) -> DiagnosticProvider {
        DiagnosticProvider::new(self.diagnostic_source.clone(), self.grammar_checker())
    }
}

/// Default configuration file: `<config dir>/pgn-ls/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pgn-ls").join("config.toml"))
}
