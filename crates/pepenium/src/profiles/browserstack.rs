//! BrowserStack profiles.
//!
//! Each target reads its own YAML file and uses the first platform entry.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::DriverProfile;
use crate::capabilities::Capabilities;
use crate::config::browserstack::{
    BrowserStackAppConfig, BrowserStackConfig, BrowserStackDesktopConfig,
    BrowserStackMobileWebConfig,
};
use crate::result::PepeniumResult;
use crate::service::AppiumService;
use crate::webdriver::SessionRequest;

/// Android native app
pub const ANDROID_APP: &str = "bs-android";
/// Chrome on Android
pub const ANDROID_WEB: &str = "bs-android-web";
/// iOS native app
pub const IOS_APP: &str = "bs-ios";
/// Safari on iOS
pub const IOS_WEB: &str = "bs-ios-web";
/// Desktop browser on macOS
pub const MAC_WEB: &str = "bs-mac";
/// Desktop browser on Windows
pub const WINDOWS_WEB: &str = "bs-windows";

/// Directory holding the YAML files
pub const DEFAULT_CONFIG_DIR: &str = "tests/resources";

const VENDOR_KEY: &str = "bstack:options";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Execution target on the BrowserStack grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStackTarget {
    /// Android native app
    AndroidApp,
    /// Chrome on Android
    AndroidWeb,
    /// iOS native app
    IosApp,
    /// Safari on iOS
    IosWeb,
    /// Desktop browser on macOS
    MacWeb,
    /// Desktop browser on Windows
    WindowsWeb,
}

impl BrowserStackTarget {
    /// YAML file read by this target
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::AndroidApp => "browserstackAndroid.yml",
            Self::AndroidWeb => "browserstackAndroidWEB.yml",
            Self::IosApp => "browserstackIOS.yml",
            Self::IosWeb => "browserstackIOSWEB.yml",
            Self::MacWeb => "browserstackMac.yml",
            Self::WindowsWeb => "browserstack.yml",
        }
    }

    /// Registry name
    #[must_use]
    pub const fn profile_name(self) -> &'static str {
        match self {
            Self::AndroidApp => ANDROID_APP,
            Self::AndroidWeb => ANDROID_WEB,
            Self::IosApp => IOS_APP,
            Self::IosWeb => IOS_WEB,
            Self::MacWeb => MAC_WEB,
            Self::WindowsWeb => WINDOWS_WEB,
        }
    }
}

/// Profile for one BrowserStack target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserStackProfile {
    target: BrowserStackTarget,
    path: PathBuf,
}

impl BrowserStackProfile {
    /// Target reading its file from `dir`
    #[must_use]
    pub fn in_dir(target: BrowserStackTarget, dir: &Path) -> Self {
        Self {
            target,
            path: dir.join(target.file_name()),
        }
    }

    /// Target reading an explicit file
    #[must_use]
    pub fn with_file(target: BrowserStackTarget, path: impl Into<PathBuf>) -> Self {
        Self {
            target,
            path: path.into(),
        }
    }

    /// Target
    #[must_use]
    pub const fn target(&self) -> BrowserStackTarget {
        self.target
    }

    /// YAML file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn app_request(&self, automation: Capabilities) -> PepeniumResult<SessionRequest> {
        let config = BrowserStackAppConfig::load(&self.path)?;
        let platform = config.first_platform(&self.path)?;

        let mut caps = automation;
        caps = put(caps, "platformName", platform.platform_name.as_deref());
        caps = put(caps, "deviceName", platform.device_name.as_deref());
        caps = put(caps, "platformVersion", platform.platform_version.as_deref());
        caps = put(caps, "app", config.app.as_deref());
        caps = caps.new_command_timeout(COMMAND_TIMEOUT);

        let mut bstack = Map::new();
        bstack.insert("appProfiling".into(), true.into());
        bstack.insert("networkLogs".into(), true.into());
        build_labels(&mut bstack, &config);
        let caps = caps
            .vendor_options(VENDOR_KEY, bstack)
            .with("browserstack.local", config.browserstack_local);
        Ok(SessionRequest::new(config.hub_url(), caps))
    }

    fn mobile_web_request(&self, platform_name: &str, browser: &str) -> PepeniumResult<SessionRequest> {
        let config = BrowserStackMobileWebConfig::load(&self.path)?;
        let platform = config.first_platform(&self.path)?;

        let mut bstack = Map::new();
        insert_opt(&mut bstack, "deviceName", platform.device_name.as_deref());
        build_labels(&mut bstack, &config);
        bstack.insert("appProfiling".into(), true.into());
        bstack.insert("networkLogs".into(), true.into());
        bstack.insert("local".into(), config.browserstack_local.into());

        let caps = Capabilities::new()
            .platform_name(platform_name)
            .browser_name(browser)
            .vendor_options(VENDOR_KEY, bstack);
        Ok(SessionRequest::new(config.hub_url(), caps))
    }

    fn desktop_request(&self, session_name: &str, network_logs: bool) -> PepeniumResult<SessionRequest> {
        let config = BrowserStackDesktopConfig::load(&self.path)?;
        let platform = config.first_platform(&self.path)?;

        let mut bstack = Map::new();
        insert_opt(&mut bstack, "os", platform.os.as_deref());
        insert_opt(&mut bstack, "osVersion", platform.os_version.as_deref());
        build_labels(&mut bstack, &config);
        bstack.insert("sessionName".into(), session_name.into());
        bstack.insert("local".into(), config.browserstack_local.into());
        if network_logs {
            bstack.insert("networkLogs".into(), true.into());
        }

        let caps = put(Capabilities::new(), "browserName", platform.browser_name.as_deref());
        let caps = put(caps, "browserVersion", platform.browser_version.as_deref())
            .vendor_options(VENDOR_KEY, bstack);
        Ok(SessionRequest::new(config.hub_url(), caps))
    }
}

fn put(caps: Capabilities, key: &str, value: Option<&str>) -> Capabilities {
    match value {
        Some(value) => caps.with(key, value),
        None => caps,
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn build_labels<P>(map: &mut Map<String, Value>, config: &BrowserStackConfig<P>) {
    insert_opt(map, "projectName", config.project_name.as_deref());
    insert_opt(map, "buildName", config.build_name.as_deref());
}

impl DriverProfile for BrowserStackProfile {
    fn name(&self) -> &'static str {
        self.target.profile_name()
    }

    fn session_request(&self, _service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        info!(target = self.target.profile_name(), path = %self.path.display(), "loading BrowserStack config");
        match self.target {
            BrowserStackTarget::AndroidApp => self.app_request(Capabilities::uiautomator2()),
            BrowserStackTarget::IosApp => self.app_request(Capabilities::new()),
            BrowserStackTarget::AndroidWeb => self.mobile_web_request("Android", "Chrome"),
            BrowserStackTarget::IosWeb => self.mobile_web_request("iOS", "Safari"),
            BrowserStackTarget::MacWeb => self.desktop_request("Prueba Mac Chrome", false),
            BrowserStackTarget::WindowsWeb => {
                self.desktop_request("Windows Browser Example - Pepenium", true)
            }
        }
    }
}
