//! Action facades used by page objects.
//!
//! [`AppActions`] drives Android apps, [`IosActions`] iOS apps and
//! [`WebActions`] browsers. Each one bundles the waits, gestures, settle
//! heuristics and screenshot sink for its platform and logs every interaction.
//!
//! Failed waits are logged and returned as errors. Boolean probes such as
//! `is_visible` turn a timeout into `Ok(false)`.

pub mod app;
pub mod ios;
pub mod web;

pub use app::AppActions;
pub use ios::IosActions;
pub use web::WebActions;

use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, warn};

use crate::clock::SharedClock;
use crate::driver::AutomationDriver;
use crate::gesture::Swipe;
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};
use crate::screenshot::ScreenshotSink;
use crate::wait::{WaitOptions, Waiter};

/// Timeouts of an action facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTimeouts {
    /// Everyday waits
    pub default: Duration,
    /// Presence waits and loading screens
    pub long: Duration,
    /// Poll interval of both
    pub poll: Duration,
}

impl ActionTimeouts {
    /// 6 s / 120 s
    pub const ANDROID: Self = Self {
        default: Duration::from_secs(6),
        long: Duration::from_secs(120),
        poll: Duration::from_millis(500),
    };

    /// 10 s / 25 s, polled every 60 ms
    pub const IOS: Self = Self {
        default: Duration::from_secs(10),
        long: Duration::from_secs(25),
        poll: Duration::from_millis(60),
    };

    /// 6 s / 120 s
    pub const WEB: Self = Self::ANDROID;

    pub(crate) fn waiters(&self, clock: &SharedClock) -> (Waiter, Waiter) {
        let short = Waiter::new(
            clock.clone(),
            WaitOptions::new()
                .with_timeout(self.default)
                .with_poll_interval(self.poll),
        );
        let long = short.with_timeout(self.long);
        (short, long)
    }
}

pub(crate) fn perform_swipe(driver: &dyn AutomationDriver, swipe: &Swipe) -> PepeniumResult<()> {
    driver.perform_actions(&[swipe.to_actions()])
}

/// Log a failed interaction and pass the result through
pub(crate) fn logged<T>(action: &str, locator: &Locator, result: PepeniumResult<T>) -> PepeniumResult<T> {
    if let Err(e) = &result {
        match e {
            PepeniumError::Timeout { .. } => error!(action, %locator, error = %e, "timed out"),
            _ => error!(action, %locator, error = %e, "failed"),
        }
    }
    result
}

/// Turn a wait into a boolean probe: timeouts become `false`
pub(crate) fn probe<T>(action: &str, locator: &Locator, result: PepeniumResult<T>) -> PepeniumResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(PepeniumError::Timeout { .. }) => {
            warn!(action, %locator, "not satisfied in time");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Capture a screenshot; failures are logged and reported as `None`
pub(crate) fn save_screenshot(driver: &dyn AutomationDriver, sink: &ScreenshotSink) -> Option<PathBuf> {
    match sink.capture(driver) {
        Ok(path) => Some(path),
        Err(e) => {
            error!(error = %e, "could not save screenshot");
            None
        }
    }
}

/// First element's text, `None` on any failure
pub(crate) fn text_of(
    driver: &dyn AutomationDriver,
    waiter: &Waiter,
    locator: &Locator,
    visible: bool,
) -> Option<String> {
    let element = if visible {
        waiter.visible(driver, locator)
    } else {
        waiter.present(driver, locator)
    };
    match element.and_then(|el| driver.element_text(&el)) {
        Ok(text) => Some(text),
        Err(e) => {
            error!(%locator, error = %e, "could not read element text");
            None
        }
    }
}
