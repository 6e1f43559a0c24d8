//! Driver profiles.
//!
//! A profile knows where a session runs (device farm, cloud grid, local
//! device) and which capabilities to ask for. Suites pick one profile and
//! hand it to a [`SuiteSession`](crate::session::SuiteSession).

pub mod aws;
pub mod browserstack;
pub mod local;

use std::fmt;
use std::path::Path;

use crate::config::env::Environment;
use crate::driver::AutomationDriver;
use crate::result::{PepeniumError, PepeniumResult};
use crate::service::AppiumService;
use crate::webdriver::{SessionRequest, WebDriverSession};

pub use aws::{AwsAndroidApp, AwsAndroidWeb, AwsIosApp};
pub use browserstack::{BrowserStackProfile, BrowserStackTarget, DEFAULT_CONFIG_DIR};
pub use local::{LocalAndroid, LocalWeb};

/// Session recipe for one execution target
pub trait DriverProfile: fmt::Debug {
    /// Registry name, e.g. `aws-android`
    fn name(&self) -> &'static str;

    /// Start a local Appium server when the target needs one
    fn start_service(&self) -> PepeniumResult<Option<AppiumService>> {
        Ok(None)
    }

    /// Hub URL and capabilities for the new session
    fn session_request(&self, service: Option<&AppiumService>) -> PepeniumResult<SessionRequest>;

    /// Open the session
    fn create_driver(
        &self,
        service: Option<&AppiumService>,
    ) -> PepeniumResult<Box<dyn AutomationDriver>> {
        let request = self.session_request(service)?;
        Ok(Box::new(WebDriverSession::create(&request)?))
    }
}

impl<P: DriverProfile + ?Sized> DriverProfile for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn start_service(&self) -> PepeniumResult<Option<AppiumService>> {
        (**self).start_service()
    }

    fn session_request(&self, service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
        (**self).session_request(service)
    }

    fn create_driver(
        &self,
        service: Option<&AppiumService>,
    ) -> PepeniumResult<Box<dyn AutomationDriver>> {
        (**self).create_driver(service)
    }
}

/// Every registered profile name
pub const PROFILE_NAMES: &[&str] = &[
    aws::ANDROID_APP,
    aws::ANDROID_WEB,
    aws::IOS_APP,
    browserstack::ANDROID_APP,
    browserstack::ANDROID_WEB,
    browserstack::IOS_APP,
    browserstack::IOS_WEB,
    browserstack::MAC_WEB,
    browserstack::WINDOWS_WEB,
    local::ANDROID,
    local::WEB,
];

/// Build a profile by registry name
///
/// BrowserStack profiles read their YAML file from `config_dir`.
pub fn profile_by_name(
    name: &str,
    env: &Environment,
    config_dir: &Path,
) -> PepeniumResult<Box<dyn DriverProfile>> {
    let profile: Box<dyn DriverProfile> = match name {
        aws::ANDROID_APP => Box::new(AwsAndroidApp::new(env.clone())),
        aws::ANDROID_WEB => Box::new(AwsAndroidWeb::new(env.clone())),
        aws::IOS_APP => Box::new(AwsIosApp::new(env.clone())),
        browserstack::ANDROID_APP => bs(BrowserStackTarget::AndroidApp, config_dir),
        browserstack::ANDROID_WEB => bs(BrowserStackTarget::AndroidWeb, config_dir),
        browserstack::IOS_APP => bs(BrowserStackTarget::IosApp, config_dir),
        browserstack::IOS_WEB => bs(BrowserStackTarget::IosWeb, config_dir),
        browserstack::MAC_WEB => bs(BrowserStackTarget::MacWeb, config_dir),
        browserstack::WINDOWS_WEB => bs(BrowserStackTarget::WindowsWeb, config_dir),
        local::ANDROID => Box::new(LocalAndroid::new(env.clone())),
        local::WEB => Box::new(LocalWeb::new(env.clone())),
        other => {
            return Err(PepeniumError::invalid_argument(format!(
                "Unknown profile '{other}', expected one of: {}",
                PROFILE_NAMES.join(", ")
            )))
        }
    };
    Ok(profile)
}

fn bs(target: BrowserStackTarget, dir: &Path) -> Box<dyn DriverProfile> {
    Box::new(BrowserStackProfile::in_dir(target, dir))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        let env = Environment::default();
        for name in PROFILE_NAMES {
            let profile = profile_by_name(name, &env, Path::new(DEFAULT_CONFIG_DIR)).unwrap();
            assert_eq!(profile.name(), *name);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = profile_by_name("sauce-android", &Environment::default(), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, PepeniumError::InvalidArgument { .. }));
        assert!(err.to_string().contains("local-android"));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names = PROFILE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PROFILE_NAMES.len());
    }
}
