//! Local profiles: an attached Android device behind an Appium server the user
//! runs, and desktop Chrome behind chromedriver.

use serde_json::{json, Map};
use std::time::Duration;

use super::DriverProfile;
use crate::capabilities::Capabilities;
use crate::config::env::{
    Environment, ANDROID_DEVICE_NAME, ANDROID_UDID, APPIUM_URL, APP_ACTIVITY, APP_PACKAGE,
    APP_PATH, CHROMEDRIVER_URL, PEPENIUM_BASE_URL,
};
use crate::result::PepeniumResult;
use crate::service::AppiumService;
use crate::webdriver::SessionRequest;

/// Android device or emulator
pub const ANDROID: &str = "local-android";
/// Desktop Chrome
pub const WEB: &str = "local-web";

/// Appium server when `APPIUM_URL` is unset
pub const DEFAULT_APPIUM_URL: &str = "http://localhost:4723";
/// Device serial when `ANDROID_UDID` is unset
pub const DEFAULT_UDID: &str = "emulator-5554";
/// Device name when `ANDROID_DEVICE_NAME` is unset
pub const DEFAULT_DEVICE_NAME: &str = "Android Device";
/// chromedriver when `CHROMEDRIVER_URL` is unset
pub const DEFAULT_CHROMEDRIVER_URL: &str = "http://localhost:9515";
/// Start page when `PEPENIUM_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "https://example.com";

/// Android device reachable through a user-run Appium server
#[derive(Debug, Clone, Default)]
pub struct LocalAndroid {
    env: Environment,
}

impl LocalAndroid {
    /// Profile reading `env`
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Requested capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::uiautomator2()
            .udid(&self.env.get_or(ANDROID_UDID, DEFAULT_UDID))
            .device_name(&self.env.get_or(ANDROID_DEVICE_NAME, DEFAULT_DEVICE_NAME))
            .new_command_timeout(Duration::from_secs(300))
            .auto_grant_permissions(true)
            .no_reset(false)
            .full_reset(false);

        if let Some(path) = self.env.get(APP_PATH) {
            let path = path.trim_matches('"');
            if !path.is_empty() {
                caps = caps.app(path);
            }
        }
        if let (Some(package), Some(activity)) =
            (self.env.get(APP_PACKAGE), self.env.get(APP_ACTIVITY))
        {
            caps = caps.app_package(package).app_activity(activity);
        }
        caps
    }
}

impl DriverProfile for LocalAndroid {
    fn name(&self) -> &'static str {
        ANDROID
    }

    fn session_request(&self, _service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        Ok(SessionRequest::new(
            self.env.get_or(APPIUM_URL, DEFAULT_APPIUM_URL),
            self.capabilities(),
        ))
    }
}

/// Desktop Chrome through chromedriver
#[derive(Debug, Clone, Default)]
pub struct LocalWeb {
    env: Environment,
}

impl LocalWeb {
    /// Profile reading `env`
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Requested capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let mut chrome = Map::new();
        chrome.insert("args".into(), json!(["start-maximized"]));
        Capabilities::new()
            .browser_name("chrome")
            .vendor_options("goog:chromeOptions", chrome)
    }
}

impl DriverProfile for LocalWeb {
    fn name(&self) -> &'static str {
        WEB
    }

    fn session_request(&self, _service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        Ok(SessionRequest::new(
            self.env.get_or(CHROMEDRIVER_URL, DEFAULT_CHROMEDRIVER_URL),
            self.capabilities(),
        )
        .with_start_url(self.env.get_or(PEPENIUM_BASE_URL, DEFAULT_BASE_URL)))
    }
}
