//! `pepenium capabilities <profile>`

use serde_json::Value;
use std::path::Path;

use pepenium::{profile_by_name, Environment};

use crate::commands::CapabilitiesArgs;
use crate::error::CliResult;
use crate::output::Output;

/// Session request of `profile` as JSON, credentials masked
pub fn request_json(profile: &str, env: &Environment, config_dir: &Path) -> CliResult<Value> {
    let profile = profile_by_name(profile, env, config_dir)?;
    let request = profile.session_request(None)?;
    Ok(request.to_redacted_json())
}

/// Print the session request of a profile
pub fn execute_capabilities(
    args: &CapabilitiesArgs,
    config_dir: &Path,
    out: &Output,
) -> CliResult<()> {
    let json = request_json(&args.profile, &Environment::from_process(), config_dir)?;
    out.data(&serde_json::to_string_pretty(&json)?);
    Ok(())
}
