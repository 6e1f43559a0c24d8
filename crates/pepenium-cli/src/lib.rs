//! Pepenium CLI library
//!
//! Argument definitions, configuration, logging setup and command handlers
//! behind the `pepenium` binary.

#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    CapabilitiesArgs, CheckConfigArgs, Cli, Commands, ConfigKind, FindArgs, LogFormat,
    ProfilesArgs, ScreenshotArgs,
};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Output;
