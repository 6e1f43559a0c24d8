//! `pepenium check-config <file> --kind ...`

use serde::Serialize;
use std::path::Path;

use pepenium::config::{
    BrowserStackAppConfig, BrowserStackConfig, BrowserStackDesktopConfig,
    BrowserStackMobileWebConfig,
};
use pepenium::webdriver::redact_credentials;

use crate::commands::{CheckConfigArgs, ConfigKind};
use crate::error::CliResult;
use crate::output::Output;

/// What a valid BrowserStack file resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    /// Account user name
    pub user_name: String,
    /// Hub URL with the credentials masked
    pub hub: String,
    /// First platform entry, e.g. `Android Pixel 8 14.0`
    pub platform: String,
    /// Number of platform entries
    pub platforms: usize,
    /// Build label
    pub build_name: Option<String>,
    /// Project label
    pub project_name: Option<String>,
    /// BrowserStack Local tunnel requested
    pub local: bool,
}

/// Parse `path` as `kind` and summarise its first platform
pub fn summarize_config(path: &Path, kind: ConfigKind) -> CliResult<ConfigSummary> {
    match kind {
        ConfigKind::App => {
            let config = BrowserStackAppConfig::load(path)?;
            let p = config.first_platform(path)?;
            let platform = describe(&[&p.platform_name, &p.device_name, &p.platform_version]);
            Ok(summary(&config, platform))
        }
        ConfigKind::MobileWeb => {
            let config = BrowserStackMobileWebConfig::load(path)?;
            let p = config.first_platform(path)?;
            let platform = describe(&[&p.device_name, &p.os_version, &p.browser_name]);
            Ok(summary(&config, platform))
        }
        ConfigKind::Desktop => {
            let config = BrowserStackDesktopConfig::load(path)?;
            let p = config.first_platform(path)?;
            let platform = describe(&[&p.browser_name, &p.browser_version, &p.os, &p.os_version]);
            Ok(summary(&config, platform))
        }
    }
}

fn describe(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary<P>(config: &BrowserStackConfig<P>, platform: String) -> ConfigSummary {
    ConfigSummary {
        user_name: config.user_name.clone(),
        hub: redact_credentials(&config.hub_url()),
        platform,
        platforms: config.platforms.len(),
        build_name: config.build_name.clone(),
        project_name: config.project_name.clone(),
        local: config.browserstack_local,
    }
}

/// Validate a BrowserStack file and print its summary
pub fn execute_check_config(args: &CheckConfigArgs, out: &Output) -> CliResult<()> {
    let summary = summarize_config(&args.file, args.kind)?;
    out.success(&format!("{} is valid", args.file.display()));
    out.field("user", &summary.user_name);
    out.field("hub", &summary.hub);
    out.field("platform", &summary.platform);
    out.field("platforms", &summary.platforms.to_string());
    if let Some(build) = &summary.build_name {
        out.field("build", build);
    }
    if let Some(project) = &summary.project_name {
        out.field("project", project);
    }
    out.field("local", &summary.local.to_string());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_app_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "app.yml",
            "userName: demo\naccessKey: k3y\nbuildName: nightly\nplatforms:\n  - platformName: android\n    deviceName: Pixel 8\n    platformVersion: '14.0'\n",
        );
        let summary = summarize_config(&path, ConfigKind::App).unwrap();
        assert_eq!(summary.platform, "android Pixel 8 14.0");
        assert_eq!(summary.build_name.as_deref(), Some("nightly"));
        assert!(!summary.hub.contains("k3y"));
        assert!(!summary.local);
    }

    #[test]
    fn test_desktop_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "desktop.yml",
            "userName: demo\naccessKey: k3y\nbrowserstackLocal: true\nplatforms:\n  - browserName: chrome\n    browserVersion: latest\n    os: Windows\n    osVersion: '11'\n  - browserName: edge\n",
        );
        let summary = summarize_config(&path, ConfigKind::Desktop).unwrap();
        assert_eq!(summary.platform, "chrome latest Windows 11");
        assert_eq!(summary.platforms, 2);
        assert!(summary.local);
    }

    #[test]
    fn test_missing_platforms() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.yml", "userName: demo\naccessKey: k3y\n");
        let err = summarize_config(&path, ConfigKind::MobileWeb).unwrap_err();
        assert!(err.to_string().contains("No platform entry"));
    }

    #[test]
    fn test_missing_file() {
        let err = summarize_config(Path::new("/nonexistent/bs.yml"), ConfigKind::App).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bs.yml"));
    }
}
