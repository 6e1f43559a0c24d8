//! AWS Device Farm profiles.
//!
//! On the farm the Appium server is already listening on the host; off the
//! farm a local server is started on a free port.

use std::time::Duration;
use tracing::info;

use super::DriverProfile;
use crate::capabilities::Capabilities;
use crate::config::env::{
    Environment, DEVICEFARM_APP_PATH, DEVICEFARM_DEVICE_NAME, DEVICEFARM_WEB_URL, IOS_APP_PATH,
};
use crate::result::PepeniumResult;
use crate::service::{AppiumService, ServiceOptions};
use crate::webdriver::SessionRequest;

/// Android native app
pub const ANDROID_APP: &str = "aws-android";
/// Android Chrome
pub const ANDROID_WEB: &str = "aws-android-web";
/// iOS native app
pub const IOS_APP: &str = "aws-ios";

/// Appium hub on a farm host
pub const FARM_HUB: &str = "http://127.0.0.1:4723/wd/hub";
/// Appium base URL on a farm host, used by the web profile
pub const FARM_WEB_HUB: &str = "http://127.0.0.1:4723";
/// Hub assumed when no local service was started
pub const LOCAL_FALLBACK_HUB: &str = "http://127.0.0.1:4723";
/// Start page of web runs when `DEVICEFARM_WEB_URL` is unset
pub const DEFAULT_WEB_URL: &str = "https://www.google.com/";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);
const WDA_TIMEOUT: Duration = Duration::from_secs(120);

fn start_local_service(env: &Environment) -> PepeniumResult<Option<AppiumService>> {
    if env.is_device_farm() {
        info!("running on Device Farm, using the host Appium server");
        return Ok(None);
    }
    let options = ServiceOptions::new().allow_insecure("chromedriver_autodownload");
    AppiumService::start(&options).map(Some)
}

fn hub(env: &Environment, service: Option<&AppiumService>, farm_hub: &str) -> String {
    if env.is_device_farm() {
        farm_hub.to_string()
    } else {
        service.map_or_else(|| LOCAL_FALLBACK_HUB.to_string(), |s| s.url().to_string())
    }
}

fn with_optional(caps: Capabilities, key: &str, value: Option<&str>) -> Capabilities {
    match value {
        Some(value) => caps.with(key, value),
        None => caps,
    }
}

/// Android native app on the farm
#[derive(Debug, Clone, Default)]
pub struct AwsAndroidApp {
    env: Environment,
}

impl AwsAndroidApp {
    /// Profile reading `env`
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Requested capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let caps = Capabilities::uiautomator2()
            .new_command_timeout(COMMAND_TIMEOUT)
            .auto_grant_permissions(true)
            .no_reset(false);
        let caps = with_optional(caps, "deviceName", self.env.get(DEVICEFARM_DEVICE_NAME));
        with_optional(caps, "app", self.env.get(DEVICEFARM_APP_PATH))
    }
}

impl DriverProfile for AwsAndroidApp {
    fn name(&self) -> &'static str {
        ANDROID_APP
    }

    fn start_service(&self) -> PepeniumResult<Option<AppiumService>> {
        start_local_service(&self.env)
    }

    fn session_request(&self, service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        Ok(SessionRequest::new(
            hub(&self.env, service, FARM_HUB),
            self.capabilities(),
        ))
    }
}

/// Chrome on an Android farm device
#[derive(Debug, Clone, Default)]
pub struct AwsAndroidWeb {
    env: Environment,
}

impl AwsAndroidWeb {
    /// Profile reading `env`
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Requested capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let caps = Capabilities::uiautomator2()
            .new_command_timeout(COMMAND_TIMEOUT)
            .browser_name("Chrome");
        with_optional(caps, "deviceName", self.env.get(DEVICEFARM_DEVICE_NAME))
    }

    /// Page opened after session start; the override only applies on the farm
    #[must_use]
    pub fn start_url(&self) -> String {
        if self.env.is_device_farm() {
            self.env.get_or(DEVICEFARM_WEB_URL, DEFAULT_WEB_URL)
        } else {
            DEFAULT_WEB_URL.to_string()
        }
    }
}

impl DriverProfile for AwsAndroidWeb {
    fn name(&self) -> &'static str {
        ANDROID_WEB
    }

    fn start_service(&self) -> PepeniumResult<Option<AppiumService>> {
        start_local_service(&self.env)
    }

    fn session_request(&self, service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        Ok(
            SessionRequest::new(hub(&self.env, service, FARM_WEB_HUB), self.capabilities())
                .with_start_url(self.start_url()),
        )
    }
}

/// iOS native app on the farm or a local simulator
#[derive(Debug, Clone, Default)]
pub struct AwsIosApp {
    env: Environment,
}

impl AwsIosApp {
    /// Profile reading `env`
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Requested capabilities
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let caps = Capabilities::xcuitest()
            .device_name(&self.env.get_or(DEVICEFARM_DEVICE_NAME, "iPhone Simulator"))
            .new_command_timeout(COMMAND_TIMEOUT)
            .wda_launch_timeout(WDA_TIMEOUT)
            .wda_connection_timeout(WDA_TIMEOUT)
            .auto_accept_alerts(true)
            .no_reset(false);
        let app = self
            .env
            .get(DEVICEFARM_APP_PATH)
            .or_else(|| self.env.get(IOS_APP_PATH));
        with_optional(caps, "app", app)
    }
}

impl DriverProfile for AwsIosApp {
    fn name(&self) -> &'static str {
        IOS_APP
    }

    fn start_service(&self) -> PepeniumResult<Option<AppiumService>> {
        start_local_service(&self.env)
    }

    fn session_request(&self, service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        Ok(SessionRequest::new(
            hub(&self.env, service, FARM_HUB),
            self.capabilities(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::env::AWS_DEVICE_FARM;

    fn farm() -> Environment {
        Environment::from_pairs([
            (DEVICEFARM_DEVICE_NAME, "Google Pixel 7"),
            (DEVICEFARM_APP_PATH, "/tmp/app.apk"),
        ])
    }

    mod android_tests {
        use super::*;

        #[test]
        fn test_farm_request() {
            let profile = AwsAndroidApp::new(farm());
            assert!(profile.start_service().unwrap().is_none());
            let request = profile.session_request(None).unwrap();
            assert_eq!(request.hub, FARM_HUB);
            let caps = &request.capabilities;
            assert_eq!(caps.get_str("platformName"), Some("Android"));
            assert_eq!(caps.get_str("automationName"), Some("UiAutomator2"));
            assert_eq!(caps.get_str("deviceName"), Some("Google Pixel 7"));
            assert_eq!(caps.get_str("app"), Some("/tmp/app.apk"));
            assert_eq!(caps.get("newCommandTimeout"), Some(&300.into()));
            assert_eq!(caps.get("autoGrantPermissions"), Some(&true.into()));
            assert_eq!(caps.get("noReset"), Some(&false.into()));
        }

        #[test]
        fn test_off_farm_without_service_uses_local_hub() {
            let profile = AwsAndroidApp::new(Environment::default());
            let request = profile.session_request(None).unwrap();
            assert_eq!(request.hub, LOCAL_FALLBACK_HUB);
            assert!(request.capabilities.get("deviceName").is_none());
        }
    }

    mod web_tests {
        use super::*;

        #[test]
        fn test_farm_web_url_override() {
            let env = Environment::from_pairs([
                (AWS_DEVICE_FARM, "1"),
                (DEVICEFARM_WEB_URL, "https://shop.example.com"),
            ]);
            let request = AwsAndroidWeb::new(env).session_request(None).unwrap();
            assert_eq!(request.hub, FARM_WEB_HUB);
            assert_eq!(request.start_url.as_deref(), Some("https://shop.example.com"));
            assert_eq!(request.capabilities.get_str("browserName"), Some("Chrome"));
        }

        #[test]
        fn test_default_web_url() {
            let request = AwsAndroidWeb::new(farm()).session_request(None).unwrap();
            assert_eq!(request.start_url.as_deref(), Some(DEFAULT_WEB_URL));
        }

        #[test]
        fn test_override_ignored_off_farm() {
            let env = Environment::from_pairs([(DEVICEFARM_WEB_URL, "https://shop.example.com")]);
            assert_eq!(AwsAndroidWeb::new(env).start_url(), DEFAULT_WEB_URL);
        }
    }

    mod ios_tests {
        use super::*;

        #[test]
        fn test_simulator_defaults() {
            let env = Environment::from_pairs([(IOS_APP_PATH, "/builds/App.app")]);
            let caps = AwsIosApp::new(env).capabilities();
            assert_eq!(caps.get_str("platformName"), Some("iOS"));
            assert_eq!(caps.get_str("automationName"), Some("XCUITest"));
            assert_eq!(caps.get_str("deviceName"), Some("iPhone Simulator"));
            assert_eq!(caps.get_str("app"), Some("/builds/App.app"));
            assert_eq!(caps.get("wdaLaunchTimeout"), Some(&120_000.into()));
            assert_eq!(caps.get("autoAcceptAlerts"), Some(&true.into()));
        }

        #[test]
        fn test_farm_app_wins() {
            let env = Environment::from_pairs([
                (DEVICEFARM_DEVICE_NAME, "iPhone 14"),
                (DEVICEFARM_APP_PATH, "/farm/App.ipa"),
                (IOS_APP_PATH, "/builds/App.app"),
            ]);
            let profile = AwsIosApp::new(env);
            let request = profile.session_request(None).unwrap();
            assert_eq!(request.hub, FARM_HUB);
            assert_eq!(request.capabilities.get_str("app"), Some("/farm/App.ipa"));
            assert_eq!(request.capabilities.get_str("deviceName"), Some("iPhone 14"));
        }
    }
}
