//! Explicit waits.
//!
//! A [`Waiter`] polls a condition through a [`Clock`](crate::clock::Clock)
//! until it yields a value or the timeout elapses. Not-found and stale-element
//! errors raised while polling are swallowed and retried.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::clock::SharedClock;
use crate::driver::{AutomationDriver, ElementRef};
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (6 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 6_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Expected state of the elements matched by a locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element is in the tree
    Present,
    /// At least one element is displayed
    Visible,
    /// A displayed, enabled element exists
    Clickable,
    /// The first element's text equals the value
    TextIs(String),
    /// The first element's text contains the value
    TextContains(String),
    /// No element is displayed (absent or hidden)
    Gone,
    /// At least this many elements are in the tree
    AtLeast(usize),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "presence"),
            Self::Visible => write!(f, "visibility"),
            Self::Clickable => write!(f, "clickability"),
            Self::TextIs(text) => write!(f, "text '{text}'"),
            Self::TextContains(text) => write!(f, "text containing '{text}'"),
            Self::Gone => write!(f, "invisibility"),
            Self::AtLeast(n) => write!(f, "at least {n} elements"),
        }
    }
}

impl Condition {
    /// Evaluate once; `Some` carries the matching elements
    pub fn evaluate(
        &self,
        driver: &dyn AutomationDriver,
        locator: &Locator,
    ) -> PepeniumResult<Option<Vec<ElementRef>>> {
        let found = driver.find_elements(locator)?;
        let satisfied = match self {
            Self::Present => found.first().map(|el| vec![el.clone()]),
            Self::AtLeast(n) => (found.len() >= *n).then_some(found),
            Self::Visible => first_displayed(driver, &found)?.map(|el| vec![el]),
            Self::Clickable => match first_displayed(driver, &found)? {
                Some(el) if driver.is_enabled(&el)? => Some(vec![el]),
                _ => None,
            },
            Self::TextIs(expected) => match found.first() {
                Some(el) if driver.element_text(el)? == *expected => Some(vec![el.clone()]),
                _ => None,
            },
            Self::TextContains(expected) => match found.first() {
                Some(el) if driver.element_text(el)?.contains(expected.as_str()) => {
                    Some(vec![el.clone()])
                }
                _ => None,
            },
            Self::Gone => {
                for el in &found {
                    match driver.is_displayed(el) {
                        Ok(true) => return Ok(None),
                        Ok(false) => {}
                        Err(e) if e.is_transient() => {}
                        Err(e) => return Err(e),
                    }
                }
                Some(Vec::new())
            }
        };
        Ok(satisfied)
    }
}

fn first_displayed(
    driver: &dyn AutomationDriver,
    elements: &[ElementRef],
) -> PepeniumResult<Option<ElementRef>> {
    for el in elements {
        if driver.is_displayed(el)? {
            return Ok(Some(el.clone()));
        }
    }
    Ok(None)
}

// =============================================================================
// WAITER
// =============================================================================

/// Polling helper bound to a clock and a timeout
#[derive(Debug, Clone)]
pub struct Waiter {
    clock: SharedClock,
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter
    #[must_use]
    pub fn new(clock: SharedClock, options: WaitOptions) -> Self {
        Self { clock, options }
    }

    /// Same clock, different timeout
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            clock: self.clock.clone(),
            options: self.options.with_timeout(timeout),
        }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `condition` until it returns `Some`
    ///
    /// Transient errors are retried; any other error aborts the wait.
    pub fn until<T>(
        &self,
        what: &str,
        mut condition: impl FnMut() -> PepeniumResult<Option<T>>,
    ) -> PepeniumResult<T> {
        let start = self.clock.now();
        let timeout = self.options.timeout();
        let mut polls = 0u32;
        loop {
            polls += 1;
            match condition() {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_transient() => debug!(what, error = %e, "ignored while polling"),
                Err(e) => return Err(e),
            }
            let elapsed = self.clock.since(start);
            if elapsed >= timeout {
                debug!(what, polls, "wait exhausted");
                return Err(PepeniumError::timeout(what, self.options.timeout_ms));
            }
            self.clock
                .sleep(self.options.poll_interval().min(timeout - elapsed));
        }
    }

    /// Wait for `condition` on the elements matched by `locator`
    pub fn for_condition(
        &self,
        driver: &dyn AutomationDriver,
        locator: &Locator,
        condition: &Condition,
    ) -> PepeniumResult<Vec<ElementRef>> {
        let what = format!("{condition} of {locator}");
        self.until(&what, || condition.evaluate(driver, locator))
    }

    fn single(
        &self,
        driver: &dyn AutomationDriver,
        locator: &Locator,
        condition: &Condition,
    ) -> PepeniumResult<ElementRef> {
        self.for_condition(driver, locator, condition)?
            .into_iter()
            .next()
            .ok_or_else(|| PepeniumError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    /// Element is in the tree
    pub fn present(&self, driver: &dyn AutomationDriver, locator: &Locator) -> PepeniumResult<ElementRef> {
        self.single(driver, locator, &Condition::Present)
    }

    /// Element is displayed
    pub fn visible(&self, driver: &dyn AutomationDriver, locator: &Locator) -> PepeniumResult<ElementRef> {
        self.single(driver, locator, &Condition::Visible)
    }

    /// Element is displayed and enabled
    pub fn clickable(&self, driver: &dyn AutomationDriver, locator: &Locator) -> PepeniumResult<ElementRef> {
        self.single(driver, locator, &Condition::Clickable)
    }

    /// Element disappeared or was hidden
    pub fn gone(&self, driver: &dyn AutomationDriver, locator: &Locator) -> PepeniumResult<()> {
        self.for_condition(driver, locator, &Condition::Gone).map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{Failure, Lookup, ScriptedDriver};

    fn waiter(clock: &FakeClock, timeout_ms: u64, poll_ms: u64) -> Waiter {
        Waiter::new(
            clock.shared(),
            WaitOptions::new()
                .with_timeout(Duration::from_millis(timeout_ms))
                .with_poll_interval(Duration::from_millis(poll_ms)),
        )
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout(), Duration::from_secs(6));
            assert_eq!(opts.poll_interval(), Duration::from_millis(500));
        }

        #[test]
        fn test_builder() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_secs(25))
                .with_poll_interval(Duration::from_millis(60));
            assert_eq!(opts.timeout_ms, 25_000);
            assert_eq!(opts.poll_interval_ms, 60);
        }
    }

    mod until_tests {
        use super::*;

        #[test]
        fn test_returns_first_value() {
            let clock = FakeClock::new();
            let mut calls = 0;
            let value = waiter(&clock, 1000, 100)
                .until("counter", || {
                    calls += 1;
                    Ok((calls == 3).then_some(calls))
                })
                .unwrap();
            assert_eq!(value, 3);
            assert_eq!(clock.now_ms(), 200);
        }

        #[test]
        fn test_times_out_without_overshooting() {
            let clock = FakeClock::new();
            let err = waiter(&clock, 1000, 300)
                .until::<()>("never", || Ok(None))
                .unwrap_err();
            assert!(matches!(err, PepeniumError::Timeout { ms: 1000, .. }));
            assert_eq!(clock.now_ms(), 1000);
        }

        #[test]
        fn test_transient_errors_are_retried() {
            let clock = FakeClock::new();
            let mut calls = 0;
            let value = waiter(&clock, 1000, 100)
                .until("flaky", || {
                    calls += 1;
                    if calls < 2 {
                        Err(PepeniumError::from_w3c("stale element reference", "x"))
                    } else {
                        Ok(Some("ok"))
                    }
                })
                .unwrap();
            assert_eq!(value, "ok");
        }

        #[test]
        fn test_hard_errors_abort() {
            let clock = FakeClock::new();
            let err = waiter(&clock, 1000, 100)
                .until::<()>("broken", || Err(PepeniumError::session("gone")))
                .unwrap_err();
            assert!(matches!(err, PepeniumError::Session { .. }));
            assert_eq!(clock.now_ms(), 0);
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_visible_after_appearing() {
            let clock = FakeClock::new();
            let driver = ScriptedDriver::android();
            let loc = Locator::id("banner");
            driver.script_lookup(&loc, vec![Lookup::Missing, Lookup::Missing, Lookup::found("b")]);
            let el = waiter(&clock, 6000, 500).visible(&driver, &loc).unwrap();
            assert_eq!(el, ElementRef::new("b"));
        }

        #[test]
        fn test_clickable_requires_enabled() {
            let clock = FakeClock::new();
            let driver = ScriptedDriver::android();
            let loc = Locator::id("submit");
            driver.place(&loc, "s").set_enabled("s", false);
            let err = waiter(&clock, 1000, 500).clickable(&driver, &loc).unwrap_err();
            assert!(matches!(err, PepeniumError::Timeout { .. }));
        }

        #[test]
        fn test_text_is() {
            let clock = FakeClock::new();
            let driver = ScriptedDriver::android();
            let loc = Locator::id("title");
            driver.place(&loc, "t").script_text("t", &["Cargando", "Inicio"]);
            let found = waiter(&clock, 6000, 500)
                .for_condition(&driver, &loc, &Condition::TextIs("Inicio".into()))
                .unwrap();
            assert_eq!(found, vec![ElementRef::new("t")]);
        }

        #[test]
        fn test_gone_when_hidden_or_stale() {
            let clock = FakeClock::new();
            let driver = ScriptedDriver::android();
            let loc = Locator::id("spinner");
            driver
                .place(&loc, "sp")
                .script_displayed("sp", vec![Ok(true), Err(Failure::Stale)]);
            waiter(&clock, 6000, 500).gone(&driver, &loc).unwrap();
            assert_eq!(clock.now_ms(), 500);
        }

        #[test]
        fn test_at_least() {
            let clock = FakeClock::new();
            let driver = ScriptedDriver::web();
            let loc = Locator::css("li");
            driver.script_lookup(&loc, vec![Lookup::many(&["a"]), Lookup::many(&["a", "b", "c"])]);
            let found = waiter(&clock, 6000, 500)
                .for_condition(&driver, &loc, &Condition::AtLeast(3))
                .unwrap();
            assert_eq!(found.len(), 3);
        }

        #[test]
        fn test_display() {
            assert_eq!(Condition::AtLeast(2).to_string(), "at least 2 elements");
            assert_eq!(Condition::Gone.to_string(), "invisibility");
        }
    }
}
