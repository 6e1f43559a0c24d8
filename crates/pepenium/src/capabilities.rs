//! Session capabilities.
//!
//! W3C standard keys are stored bare, Appium keys get the `appium:` prefix and
//! vendor blocks (`bstack:options`) are nested objects. Setters mirror the
//! UiAutomator2 / XCUITest option builders test authors already know.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;

/// Keys defined by W3C WebDriver, never prefixed
const W3C_KEYS: &[&str] = &[
    "platformName",
    "browserName",
    "browserVersion",
    "acceptInsecureCerts",
    "pageLoadStrategy",
    "proxy",
    "setWindowRect",
    "timeouts",
    "strictFileInteractability",
    "unhandledPromptBehavior",
    "webSocketUrl",
];

const APPIUM_PREFIX: &str = "appium:";

/// Target platform of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Android device or emulator
    Android,
    /// iPhone / iPad device or simulator
    Ios,
    /// Anything else (desktop browsers, unknown)
    Other(String),
}

impl Platform {
    /// Classify a `platformName` value, case-insensitively
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "android" => Self::Android,
            "ios" => Self::Ios,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    /// Android session
    #[must_use]
    pub const fn is_android(&self) -> bool {
        matches!(self, Self::Android)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => write!(f, "Android"),
            Self::Ios => write!(f, "iOS"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Capabilities negotiated when creating a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    entries: Map<String, Value>,
}

impl Capabilities {
    /// Empty capability set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Android native app through UiAutomator2
    #[must_use]
    pub fn uiautomator2() -> Self {
        Self::new()
            .platform_name("Android")
            .automation_name("UiAutomator2")
    }

    /// iOS native app through XCUITest
    #[must_use]
    pub fn xcuitest() -> Self {
        Self::new().platform_name("iOS").automation_name("XCUITest")
    }

    /// Set a capability, prefixing non-standard keys with `appium:`
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a capability in place, prefixing non-standard keys with `appium:`
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(qualify(key), value.into());
    }

    /// Look a capability up by bare or prefixed key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .get(key)
            .or_else(|| self.entries.get(&qualify(key)))
    }

    /// String value of a capability
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `platformName`
    #[must_use]
    pub fn platform_name(self, name: &str) -> Self {
        self.with("platformName", name)
    }

    /// `browserName`
    #[must_use]
    pub fn browser_name(self, name: &str) -> Self {
        self.with("browserName", name)
    }

    /// `browserVersion`
    #[must_use]
    pub fn browser_version(self, version: &str) -> Self {
        self.with("browserVersion", version)
    }

    /// `appium:automationName`
    #[must_use]
    pub fn automation_name(self, name: &str) -> Self {
        self.with("automationName", name)
    }

    /// `appium:deviceName`
    #[must_use]
    pub fn device_name(self, name: &str) -> Self {
        self.with("deviceName", name)
    }

    /// `appium:platformVersion`
    #[must_use]
    pub fn platform_version(self, version: &str) -> Self {
        self.with("platformVersion", version)
    }

    /// `appium:udid`
    #[must_use]
    pub fn udid(self, udid: &str) -> Self {
        self.with("udid", udid)
    }

    /// `appium:app`
    #[must_use]
    pub fn app(self, app: &str) -> Self {
        self.with("app", app)
    }

    /// `appium:appPackage`
    #[must_use]
    pub fn app_package(self, package: &str) -> Self {
        self.with("appPackage", package)
    }

    /// `appium:appActivity`
    #[must_use]
    pub fn app_activity(self, activity: &str) -> Self {
        self.with("appActivity", activity)
    }

    /// `appium:newCommandTimeout`, in seconds
    #[must_use]
    pub fn new_command_timeout(self, timeout: Duration) -> Self {
        self.with("newCommandTimeout", timeout.as_secs())
    }

    /// `appium:autoGrantPermissions`
    #[must_use]
    pub fn auto_grant_permissions(self, enabled: bool) -> Self {
        self.with("autoGrantPermissions", enabled)
    }

    /// `appium:autoAcceptAlerts`
    #[must_use]
    pub fn auto_accept_alerts(self, enabled: bool) -> Self {
        self.with("autoAcceptAlerts", enabled)
    }

    /// `appium:noReset`
    #[must_use]
    pub fn no_reset(self, enabled: bool) -> Self {
        self.with("noReset", enabled)
    }

    /// `appium:fullReset`
    #[must_use]
    pub fn full_reset(self, enabled: bool) -> Self {
        self.with("fullReset", enabled)
    }

    /// `appium:wdaLaunchTimeout`, in milliseconds
    #[must_use]
    pub fn wda_launch_timeout(self, timeout: Duration) -> Self {
        self.with("wdaLaunchTimeout", timeout.as_millis() as u64)
    }

    /// `appium:wdaConnectionTimeout`, in milliseconds
    #[must_use]
    pub fn wda_connection_timeout(self, timeout: Duration) -> Self {
        self.with("wdaConnectionTimeout", timeout.as_millis() as u64)
    }

    /// Nested vendor block such as `bstack:options`
    #[must_use]
    pub fn vendor_options(mut self, key: &str, options: Map<String, Value>) -> Self {
        self.entries.insert(key.to_string(), Value::Object(options));
        self
    }

    /// Platform named by `platformName`
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.get_str("platformName")
            .map_or_else(|| Platform::Other(String::new()), Platform::from_name)
    }

    /// Underlying map
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Body of a W3C new-session request
    #[must_use]
    pub fn to_session_payload(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": Value::Object(self.entries.clone()),
                "firstMatch": [{}],
            }
        })
    }
}

fn qualify(key: &str) -> String {
    if key.contains(':') || W3C_KEYS.contains(&key) {
        key.to_string()
    } else {
        format!("{APPIUM_PREFIX}{key}")
    }
}
