//! `pepenium profiles`

use serde::Serialize;

use crate::commands::ProfilesArgs;
use crate::error::CliResult;
use crate::output::Output;

/// One registered profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEntry {
    /// Registry name
    pub name: &'static str,
    /// Where sessions run: `aws`, `browserstack` or `local`
    pub provider: &'static str,
}

/// Every registered profile with its provider
#[must_use]
pub fn profile_entries() -> Vec<ProfileEntry> {
    pepenium::PROFILE_NAMES
        .iter()
        .map(|&name| ProfileEntry {
            name,
            provider: provider_of(name),
        })
        .collect()
}

fn provider_of(name: &str) -> &'static str {
    if name.starts_with("aws-") {
        "aws"
    } else if name.starts_with("bs-") {
        "browserstack"
    } else {
        "local"
    }
}

/// List the profiles
pub fn execute_profiles(args: &ProfilesArgs, out: &Output) -> CliResult<()> {
    let entries = profile_entries();
    if args.json {
        out.data(&serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        out.data(&format!("{:<16} {}", entry.name, entry.provider));
    }
    Ok(())
}
