//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pepenium: inspect driver profiles and probe Appium / WebDriver sessions
#[derive(Parser, Debug)]
#[command(name = "pepenium")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Directory holding the BrowserStack YAML files
    #[arg(
        long,
        env = "PEPENIUM_CONFIG_DIR",
        default_value = pepenium::profiles::DEFAULT_CONFIG_DIR,
        global = true
    )]
    pub config_dir: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the driver profile names
    Profiles(ProfilesArgs),

    /// Print the session request a profile would send (credentials masked)
    Capabilities(CapabilitiesArgs),

    /// Parse a BrowserStack YAML file and report its first platform
    CheckConfig(CheckConfigArgs),

    /// Open a session, let the screen settle, save a screenshot and quit
    Screenshot(ScreenshotArgs),

    /// Open a session and scroll until an element is visible
    Find(FindArgs),
}

/// Arguments for the profiles command
#[derive(Args, Debug, Default)]
pub struct ProfilesArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the capabilities command
#[derive(Args, Debug)]
pub struct CapabilitiesArgs {
    /// Profile name, see `pepenium profiles`
    pub profile: String,
}

/// Shape of a BrowserStack YAML file
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    /// Native app runs
    App,
    /// Mobile browser runs
    MobileWeb,
    /// Desktop browser runs
    Desktop,
}

/// Arguments for the check-config command
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// YAML file to parse
    pub file: PathBuf,

    /// Expected file shape
    #[arg(long, value_enum, default_value = "app")]
    pub kind: ConfigKind,
}

/// Arguments for the screenshot command
#[derive(Args, Debug)]
pub struct ScreenshotArgs {
    /// Profile name
    pub profile: String,

    /// Output directory (defaults to the screenshot directory of the environment)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the find command
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Profile name
    pub profile: String,

    /// Locator as `<strategy>=<value>`, e.g. `id=com.app:id/ok`
    #[arg(short, long)]
    pub locator: String,

    /// Swipe budget
    #[arg(long, default_value_t = pepenium::scroll::DEFAULT_MAX_SWIPES)]
    pub max_swipes: u32,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}
