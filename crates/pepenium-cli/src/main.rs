//! Pepenium CLI
//!
//! ## Usage
//!
//! ```bash
//! pepenium profiles                                  # List driver profiles
//! pepenium capabilities bs-android                   # Show the session request
//! pepenium check-config tests/resources/browserstack.yml --kind desktop
//! pepenium -v find aws-android --locator "id=com.app:id/pay" --max-swipes 6
//! ```

use clap::Parser;
use pepenium_cli::{
    handlers, logging::init_tracing, Cli, CliConfig, CliResult, Commands, Output,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    init_tracing(&config)?;
    let out = Output::new(config.verbosity);

    match &cli.command {
        Commands::Profiles(args) => handlers::execute_profiles(args, &out),
        Commands::Capabilities(args) => {
            handlers::execute_capabilities(args, &config.config_dir, &out)
        }
        Commands::CheckConfig(args) => handlers::execute_check_config(args, &out),
        Commands::Screenshot(args) => handlers::execute_screenshot(args, &config.config_dir, &out),
        Commands::Find(args) => handlers::execute_find(args, &config.config_dir, &out),
    }
}
