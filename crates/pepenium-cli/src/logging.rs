//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::LogFormat;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Filter for `config`; `RUST_LOG` wins when set
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_directive()))
}

/// Install the global subscriber, writing to stderr so stdout stays parseable
pub fn init_tracing(config: &CliConfig) -> CliResult<()> {
    let (text, json) = match config.log_format {
        LogFormat::Text => (
            Some(fmt::layer().with_writer(std::io::stderr).with_target(false)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(text)
        .with(json)
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}
