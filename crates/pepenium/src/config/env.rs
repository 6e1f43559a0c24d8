//! Environment snapshot.

use std::collections::HashMap;

/// Device name exported by AWS Device Farm
pub const DEVICEFARM_DEVICE_NAME: &str = "DEVICEFARM_DEVICE_NAME";
/// App package path exported by AWS Device Farm
pub const DEVICEFARM_APP_PATH: &str = "DEVICEFARM_APP_PATH";
/// Start URL for mobile web runs on the farm
pub const DEVICEFARM_WEB_URL: &str = "DEVICEFARM_WEB_URL";
/// Screenshot directory
pub const DEVICEFARM_SCREENSHOT_PATH: &str = "DEVICEFARM_SCREENSHOT_PATH";
/// Generic farm marker
pub const AWS_DEVICE_FARM: &str = "AWS_DEVICE_FARM";
/// Local iOS app bundle
pub const IOS_APP_PATH: &str = "IOS_APP_PATH";
/// Appium server for local runs
pub const APPIUM_URL: &str = "APPIUM_URL";
/// Local Android device serial
pub const ANDROID_UDID: &str = "ANDROID_UDID";
/// Local Android device name
pub const ANDROID_DEVICE_NAME: &str = "ANDROID_DEVICE_NAME";
/// Local APK path
pub const APP_PATH: &str = "APP_PATH";
/// Android package to launch
pub const APP_PACKAGE: &str = "APP_PACKAGE";
/// Android activity to launch
pub const APP_ACTIVITY: &str = "APP_ACTIVITY";
/// Start URL for local desktop web runs
pub const PEPENIUM_BASE_URL: &str = "PEPENIUM_BASE_URL";
/// Local chromedriver endpoint
pub const CHROMEDRIVER_URL: &str = "CHROMEDRIVER_URL";

/// Read-only copy of the environment taken once
///
/// Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Snapshot of the current process environment
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Environment built from explicit pairs
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Trimmed value, `None` when unset or blank
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value or `default`
    #[must_use]
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Running on AWS Device Farm
    #[must_use]
    pub fn is_device_farm(&self) -> bool {
        self.get(DEVICEFARM_DEVICE_NAME).is_some() || self.get(AWS_DEVICE_FARM).is_some()
    }
}
