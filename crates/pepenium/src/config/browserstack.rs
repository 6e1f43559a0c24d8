//! BrowserStack YAML configuration records.
//!
//! Three shapes exist: native app runs, mobile web runs and desktop web runs.
//! They share the account fields and differ in their `platforms` entries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::result::{PepeniumError, PepeniumResult};

/// Read and parse a YAML file
///
/// Read and parse failures are reported as [`PepeniumError::Config`] naming
/// the file.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> PepeniumResult<T> {
    let text = fs::read_to_string(path).map_err(|e| PepeniumError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_yaml(&text, path)
}

fn parse_yaml<T: DeserializeOwned>(text: &str, path: &Path) -> PepeniumResult<T> {
    serde_yaml_ng::from_str(text).map_err(|e| PepeniumError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Native app platform entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPlatform {
    /// `Android` or `iOS`
    #[serde(default)]
    pub platform_name: Option<String>,
    /// Device model
    #[serde(default)]
    pub device_name: Option<String>,
    /// OS version
    #[serde(default)]
    pub platform_version: Option<String>,
}

/// Mobile web platform entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileWebPlatform {
    /// Device model
    #[serde(default)]
    pub device_name: Option<String>,
    /// OS version
    #[serde(default)]
    pub os_version: Option<String>,
    /// Browser
    #[serde(default)]
    pub browser_name: Option<String>,
    /// `portrait` / `landscape`
    #[serde(default)]
    pub device_orientation: Option<String>,
}

/// Desktop web platform entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopPlatform {
    /// Browser
    #[serde(default)]
    pub browser_name: Option<String>,
    /// Browser version, e.g. `latest`
    #[serde(default)]
    pub browser_version: Option<String>,
    /// `OS X` / `Windows`
    #[serde(default)]
    pub os: Option<String>,
    /// OS version
    #[serde(default)]
    pub os_version: Option<String>,
}

/// BrowserStack account and build settings shared by every file shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserStackConfig<P> {
    /// Account user name
    pub user_name: String,
    /// Account access key
    pub access_key: String,
    /// Test framework label
    #[serde(default)]
    pub framework: Option<String>,
    /// Uploaded app id (`bs://...`), app runs only
    #[serde(default)]
    pub app: Option<String>,
    /// Target platforms; the first one is used
    #[serde(default = "Vec::new")]
    pub platforms: Vec<P>,
    /// Parallel sessions per platform
    #[serde(default)]
    pub parallels_per_platform: u32,
    /// Route traffic through BrowserStack Local
    #[serde(default)]
    pub browserstack_local: bool,
    /// Build label
    #[serde(default)]
    pub build_name: Option<String>,
    /// Project label
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Native app runs
pub type BrowserStackAppConfig = BrowserStackConfig<AppPlatform>;
/// Mobile web runs
pub type BrowserStackMobileWebConfig = BrowserStackConfig<MobileWebPlatform>;
/// Desktop web runs
pub type BrowserStackDesktopConfig = BrowserStackConfig<DesktopPlatform>;

impl<P: DeserializeOwned> BrowserStackConfig<P> {
    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> PepeniumResult<Self> {
        load_yaml(path.as_ref())
    }

    /// Parse YAML text; `origin` names the source in errors
    pub fn from_yaml(text: &str, origin: impl AsRef<Path>) -> PepeniumResult<Self> {
        parse_yaml(text, origin.as_ref())
    }
}

impl<P> BrowserStackConfig<P> {
    /// First platform entry, or [`PepeniumError::MissingPlatform`]
    pub fn first_platform(&self, origin: impl AsRef<Path>) -> PepeniumResult<&P> {
        self.platforms
            .first()
            .ok_or_else(|| PepeniumError::MissingPlatform {
                path: origin.as_ref().to_path_buf(),
            })
    }

    /// Remote hub URL with the account credentials embedded
    #[must_use]
    pub fn hub_url(&self) -> String {
        format!(
            "https://{}:{}@hub-cloud.browserstack.com/wd/hub",
            self.user_name, self.access_key
        )
    }
}
