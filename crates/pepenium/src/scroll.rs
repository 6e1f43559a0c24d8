//! Scroll-until-found resolver.
//!
//! Locates an element that may be off screen: query, scroll, re-query. On
//! Android a native `UiScrollable` lookup is tried first when the locator can be
//! expressed as a `UiSelector`. The swipe loop stops early once the page source
//! stops changing, which is taken as the end of the list.

use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::driver::{AutomationDriver, ElementRef};
use crate::gesture::SafeZone;
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};

/// Attempt budget used when the caller passes less than 1
pub const DEFAULT_MAX_SWIPES: u32 = 8;

/// Implicit wait in effect while resolving
pub const RESOLVE_IMPLICIT_WAIT: Duration = Duration::from_millis(200);

/// Consecutive unchanged page hashes treated as end of content
pub const STAGNATION_LIMIT: u32 = 2;

/// Scroll-until-found over a driver
#[derive(Debug, Clone, Copy)]
pub struct ScrollResolver<'a> {
    driver: &'a dyn AutomationDriver,
}

impl<'a> ScrollResolver<'a> {
    /// Resolver over `driver`
    #[must_use]
    pub fn new(driver: &'a dyn AutomationDriver) -> Self {
        Self { driver }
    }

    /// Find a displayed element matching `locator`, scrolling up to
    /// `max_swipes` times
    ///
    /// The implicit wait is lowered for the duration of the call and restored
    /// afterwards, on failure too.
    pub fn scroll_to(&self, locator: &Locator, max_swipes: u32) -> PepeniumResult<ElementRef> {
        let budget = if max_swipes < 1 {
            DEFAULT_MAX_SWIPES
        } else {
            max_swipes
        };
        info!(%locator, budget, "scrolling to element");

        let original = self.driver.implicit_wait().unwrap_or(Duration::ZERO);
        self.driver.set_implicit_wait(RESOLVE_IMPLICIT_WAIT)?;
        let result = self.resolve(locator, budget);
        if let Err(e) = self.driver.set_implicit_wait(original) {
            warn!(error = %e, "could not restore implicit wait");
        }
        result
    }

    fn resolve(&self, locator: &Locator, budget: u32) -> PepeniumResult<ElementRef> {
        if let Some(element) = self.find_displayed(locator)? {
            debug!(%locator, "visible without scrolling");
            return Ok(element);
        }

        if self.driver.platform().is_android() {
            if let Some(element) = self.native_scroll(locator) {
                return Ok(element);
            }
        }

        let mut attempts = 0u32;
        let mut stagnant = 0u32;
        let mut last_hash: Option<Vec<u8>> = None;
        while attempts < budget {
            if let Some(element) = self.find_displayed(locator)? {
                info!(%locator, attempts, "found after scrolling");
                return Ok(element);
            }

            let moved = self.swipe_safe();
            let hash = self.page_hash();
            stagnant = if hash.is_some() && hash == last_hash {
                stagnant + 1
            } else {
                0
            };
            last_hash = hash;

            if !moved || stagnant >= STAGNATION_LIMIT {
                debug!(moved, stagnant, "end of content");
                break;
            }
            attempts += 1;
        }

        if let Some(element) = self.find_displayed(locator)? {
            return Ok(element);
        }

        warn!(%locator, budget, "element not found after scrolling");
        Err(PepeniumError::NotFound {
            locator: locator.to_string(),
            attempts: budget,
        })
    }

    /// First displayed match; stale matches are skipped
    fn find_displayed(&self, locator: &Locator) -> PepeniumResult<Option<ElementRef>> {
        for element in self.driver.find_elements(locator)? {
            match self.driver.is_displayed(&element) {
                Ok(true) => return Ok(Some(element)),
                Ok(false) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn native_scroll(&self, locator: &Locator) -> Option<ElementRef> {
        let selector = locator.to_ui_selector()?;
        let script = Locator::ui_automator(format!(
            "new UiScrollable(new UiSelector().scrollable(true)).setAsVerticalList().scrollIntoView({selector});"
        ));
        match self.driver.find_element(&script) {
            Ok(element) => {
                info!(%locator, "found with UiScrollable");
                Some(element)
            }
            Err(e) => {
                debug!(error = %e, "UiScrollable lookup failed, falling back to swipes");
                None
            }
        }
    }

    fn swipe_safe(&self) -> bool {
        let size = match self.driver.window_size() {
            Ok(size) => size,
            Err(e) => {
                debug!(error = %e, "window size unavailable");
                return false;
            }
        };
        let swipe = SafeZone::of(size).scroll_swipe();
        match self.driver.perform_actions(&[swipe.to_actions()]) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "swipe failed");
                false
            }
        }
    }

    /// `None` when the page source cannot be read
    fn page_hash(&self) -> Option<Vec<u8>> {
        self.driver
            .page_source()
            .ok()
            .map(|source| Sha256::digest(source.as_bytes()).to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{Failure, Lookup, ScriptedDriver};

    fn changing_sources(n: usize) -> Vec<Result<String, Failure>> {
        (0..n).map(|i| Ok(format!("<list offset='{i}'/>"))).collect()
    }

    #[test]
    fn test_found_immediately_no_scroll() {
        let driver = ScriptedDriver::ios();
        let loc = Locator::accessibility_id("row-1");
        driver.place(&loc, "r1");
        let el = ScrollResolver::new(&driver).scroll_to(&loc, 5).unwrap();
        assert_eq!(el, ElementRef::new("r1"));
        assert!(!driver.was_called("perform_actions"));
    }

    #[test]
    fn test_hidden_match_is_ignored() {
        let driver = ScriptedDriver::ios();
        let loc = Locator::accessibility_id("row-1");
        driver
            .script_lookup(
                &loc,
                vec![
                    Lookup::many(&["hidden"]),
                    Lookup::many(&["hidden"]),
                    Lookup::many(&["hidden", "r1"]),
                ],
            )
            .script_displayed("hidden", vec![Ok(false)])
            .script_page_sources(changing_sources(10));
        let el = ScrollResolver::new(&driver).scroll_to(&loc, 5).unwrap();
        assert_eq!(el, ElementRef::new("r1"));
        assert_eq!(driver.call_count("perform_actions"), 1);
    }

    #[test]
    fn test_zero_budget_uses_default() {
        let driver = ScriptedDriver::ios();
        driver.script_page_sources(changing_sources(20));
        let err = ScrollResolver::new(&driver)
            .scroll_to(&Locator::accessibility_id("nope"), 0)
            .unwrap_err();
        assert!(matches!(err, PepeniumError::NotFound { attempts: 8, .. }));
        assert_eq!(driver.call_count("perform_actions"), 8);
    }

    #[test]
    fn test_failed_swipe_ends_loop() {
        let driver = ScriptedDriver::ios();
        driver.script_gestures(vec![Err(Failure::Other("no touch".into()))]);
        let err = ScrollResolver::new(&driver)
            .scroll_to(&Locator::accessibility_id("nope"), 6)
            .unwrap_err();
        assert!(matches!(err, PepeniumError::NotFound { attempts: 6, .. }));
        assert_eq!(driver.call_count("perform_actions"), 1);
    }

    #[test]
    fn test_unreadable_source_counts_as_change() {
        let driver = ScriptedDriver::ios();
        driver.script_page_sources(vec![Err(Failure::Other("busy".into()))]);
        let _ = ScrollResolver::new(&driver).scroll_to(&Locator::accessibility_id("x"), 4);
        assert_eq!(driver.call_count("perform_actions"), 4);
    }

    #[test]
    fn test_implicit_wait_restored() {
        let driver = ScriptedDriver::ios();
        driver.set_implicit_wait(Duration::from_secs(3)).unwrap();
        let _ = ScrollResolver::new(&driver).scroll_to(&Locator::accessibility_id("x"), 2);
        assert!(driver.was_called("set_implicit_wait:200"));
        assert_eq!(driver.implicit_wait().unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_android_tries_ui_scrollable_first() {
        let driver = ScriptedDriver::android();
        let target = Locator::xpath("//*[@resource-id='settings-row']");
        let native = Locator::ui_automator(
            "new UiScrollable(new UiSelector().scrollable(true)).setAsVerticalList()\
             .scrollIntoView(new UiSelector().resourceId(\"settings-row\"));",
        );
        driver.place(&native, "row");
        let el = ScrollResolver::new(&driver).scroll_to(&target, 8).unwrap();
        assert_eq!(el, ElementRef::new("row"));
        assert!(!driver.was_called("perform_actions"));
    }

    #[test]
    fn test_android_without_ui_selector_swipes() {
        let driver = ScriptedDriver::android();
        let target = Locator::xpath("//android.widget.Button[3]");
        driver
            .script_lookup(&target, vec![Lookup::Missing, Lookup::Missing, Lookup::found("b3")])
            .script_page_sources(changing_sources(5));
        let el = ScrollResolver::new(&driver).scroll_to(&target, 8).unwrap();
        assert_eq!(el, ElementRef::new("b3"));
        assert_eq!(driver.call_count("perform_actions"), 1);
        assert_eq!(driver.call_count("find_elements:By.androidUIAutomator"), 0);
    }

    #[test]
    fn test_swipe_stays_in_safe_zone() {
        let driver = ScriptedDriver::ios();
        driver.script_page_sources(changing_sources(5));
        let _ = ScrollResolver::new(&driver).scroll_to(&Locator::accessibility_id("x"), 1);
        let batches = driver.performed();
        let seq = &batches[0][0];
        let zone = SafeZone::of(crate::locator::Size::new(1080, 2400));
        for step in &seq.steps {
            if let crate::input::InputStep::PointerMove { to, .. } = step {
                assert!(zone.contains(*to));
            }
        }
    }
}
