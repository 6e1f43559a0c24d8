//! Suite session: one driver per suite, set up before and torn down after.
//!
//! ```rust,no_run
//! use pepenium::config::Environment;
//! use pepenium::profiles::LocalAndroid;
//! use pepenium::SuiteSession;
//!
//! # fn main() -> pepenium::PepeniumResult<()> {
//! let mut session = SuiteSession::new(LocalAndroid::new(Environment::from_process()));
//! session.setup()?;
//! let _driver = session.driver()?;
//! session.teardown()?;
//! # Ok(())
//! # }
//! ```

use tracing::{error, info};

use crate::driver::AutomationDriver;
use crate::profiles::DriverProfile;
use crate::result::{PepeniumError, PepeniumResult};
use crate::service::AppiumService;

/// Lifecycle of a [`SuiteSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not set up yet
    Idle,
    /// Driver is open
    Running,
    /// Setup failed; whatever was started has been released
    Failed,
    /// Torn down
    Closed,
}

/// Owns the driver (and the local Appium server, if any) of one suite
#[derive(Debug)]
pub struct SuiteSession<P: DriverProfile> {
    profile: P,
    service: Option<AppiumService>,
    driver: Option<Box<dyn AutomationDriver>>,
    state: SessionState,
}

impl<P: DriverProfile> SuiteSession<P> {
    /// Session for `profile`; nothing starts until [`setup`](Self::setup)
    #[must_use]
    pub fn new(profile: P) -> Self {
        Self {
            profile,
            service: None,
            driver: None,
            state: SessionState::Idle,
        }
    }

    /// Start the service when the profile needs one, then open the driver
    pub fn setup(&mut self) -> PepeniumResult<()> {
        if self.state == SessionState::Running {
            return Err(PepeniumError::session(format!(
                "{} session is already running",
                self.profile.name()
            )));
        }
        info!(profile = self.profile.name(), "setting up suite session");
        self.service = match self.profile.start_service() {
            Ok(service) => service,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
        };
        match self.profile.create_driver(self.service.as_ref()) {
            Ok(driver) => {
                self.driver = Some(driver);
                self.state = SessionState::Running;
                info!(profile = self.profile.name(), "driver ready");
                Ok(())
            }
            Err(e) => {
                error!(profile = self.profile.name(), error = %e, "driver creation failed");
                self.stop_service();
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// The open driver
    pub fn driver(&self) -> PepeniumResult<&dyn AutomationDriver> {
        self.driver.as_deref().ok_or_else(|| {
            PepeniumError::session(format!("{} session is not set up", self.profile.name()))
        })
    }

    /// The profile this session was built from
    #[must_use]
    pub const fn profile(&self) -> &P {
        &self.profile
    }

    /// URL of the local Appium server, when one was started
    #[must_use]
    pub fn service_url(&self) -> Option<&str> {
        self.service.as_ref().map(AppiumService::url)
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Quit the driver, then stop the service
    ///
    /// Safe to call more than once. The service is stopped even when quitting
    /// the driver fails; that failure is returned afterwards.
    pub fn teardown(&mut self) -> PepeniumResult<()> {
        let quit = match self.driver.take() {
            Some(driver) => {
                info!(profile = self.profile.name(), "quitting driver");
                driver.quit()
            }
            None => Ok(()),
        };
        if let Err(e) = &quit {
            error!(profile = self.profile.name(), error = %e, "driver quit failed");
        }
        self.stop_service();
        if self.state == SessionState::Running {
            self.state = SessionState::Closed;
        }
        quit
    }

    fn stop_service(&mut self) {
        if let Some(mut service) = self.service.take() {
            service.stop();
        }
    }
}

impl<P: DriverProfile> Drop for SuiteSession<P> {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::mock::ScriptedDriver;
    use crate::webdriver::SessionRequest;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct FakeProfile {
        driver: Rc<ScriptedDriver>,
        fail: bool,
        created: Cell<u32>,
    }

    impl FakeProfile {
        fn new(fail: bool) -> Self {
            Self {
                driver: Rc::new(ScriptedDriver::android()),
                fail,
                created: Cell::new(0),
            }
        }
    }

    impl DriverProfile for FakeProfile {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn session_request(&self, _service: Option<&AppiumService>) -> PepeniumResult<SessionRequest> {
            Ok(SessionRequest::new("http://127.0.0.1:1", Capabilities::new()))
        }

        fn create_driver(
            &self,
            _service: Option<&AppiumService>,
        ) -> PepeniumResult<Box<dyn AutomationDriver>> {
            if self.fail {
                return Err(PepeniumError::session("device offline"));
            }
            self.created.set(self.created.get() + 1);
            Ok(Box::new(Rc::clone(&self.driver)))
        }
    }

    #[test]
    fn test_driver_before_setup() {
        let session = SuiteSession::new(FakeProfile::new(false));
        assert_eq!(session.state(), SessionState::Idle);
        let err = session.driver().unwrap_err();
        assert_eq!(err.to_string(), "Session error: fake session is not set up");
    }

    #[test]
    fn test_setup_then_teardown() {
        let mut session = SuiteSession::new(FakeProfile::new(false));
        session.setup().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.service_url().is_none());
        session.driver().unwrap().navigate("https://example.com").unwrap();

        session.teardown().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.profile().driver.is_quit());
        assert!(session.driver().is_err());

        session.teardown().unwrap();
        assert_eq!(session.profile().driver.call_count("quit"), 1);
    }

    #[test]
    fn test_double_setup_rejected() {
        let mut session = SuiteSession::new(FakeProfile::new(false));
        session.setup().unwrap();
        assert!(session.setup().is_err());
        assert_eq!(session.profile().created.get(), 1);
    }

    #[test]
    fn test_failed_setup() {
        let mut session = SuiteSession::new(FakeProfile::new(true));
        assert!(session.setup().is_err());
        assert_eq!(session.state(), SessionState::Failed);
        session.teardown().unwrap();
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn test_drop_quits_driver() {
        let profile = FakeProfile::new(false);
        let driver = Rc::clone(&profile.driver);
        {
            let mut session = SuiteSession::new(profile);
            session.setup().unwrap();
        }
        assert!(driver.is_quit());
    }
}
