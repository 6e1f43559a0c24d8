//! CLI configuration

use std::path::PathBuf;

use crate::commands::{Cli, LogFormat};

/// Verbosity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Interactions and warnings
    #[default]
    Normal,
    /// Poll iterations and settle samples
    Verbose,
    /// Everything, including HTTP traffic
    Trace,
}

impl Verbosity {
    /// Level from the `-q` / `-v` flags
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Filter directive used when `RUST_LOG` is unset
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "pepenium=debug,info",
            Self::Trace => "trace",
        }
    }
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Log output format
    pub log_format: LogFormat,
    /// Directory holding the BrowserStack YAML files
    pub config_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            log_format: LogFormat::Text,
            config_dir: PathBuf::from(pepenium::profiles::DEFAULT_CONFIG_DIR),
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from parsed arguments
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbosity: Verbosity::from_flags(cli.verbose, cli.quiet),
            log_format: cli.log_format,
            config_dir: cli.config_dir.clone(),
        }
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the BrowserStack config directory
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }
}
