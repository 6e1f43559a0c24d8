//! iOS app actions.
//!
//! XCUITest needs more slack than UiAutomator2: longer default timeouts,
//! faster polling, larger gesture margins and a tap fallback for clicks that
//! land on an overlay.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{logged, perform_swipe, probe, save_screenshot, text_of, ActionTimeouts};
use crate::clock::SharedClock;
use crate::config::env::Environment;
use crate::driver::{AutomationDriver, ElementRef};
use crate::gesture::{swipe_at_element, tap, Direction, ElementSwipeLimits, SwipeRatios};
use crate::locator::{Locator, Point};
use crate::result::{PepeniumError, PepeniumResult};
use crate::screenshot::ScreenshotSink;
use crate::scroll::ScrollResolver;
use crate::settle::{ScreenStabilityDetector, StabilityPolicy};
use crate::wait::{Condition, Waiter};

/// Swipe budget of [`IosActions::safe_scroll`]
pub const SAFE_SCROLL_ATTEMPTS: u32 = 12;

/// Interactions with an iOS app
#[derive(Debug)]
pub struct IosActions<'a> {
    driver: &'a dyn AutomationDriver,
    clock: SharedClock,
    short: Waiter,
    long: Waiter,
    detector: ScreenStabilityDetector,
    sink: ScreenshotSink,
}

impl<'a> IosActions<'a> {
    /// Actions over `driver`
    #[must_use]
    pub fn new(driver: &'a dyn AutomationDriver, clock: SharedClock) -> Self {
        let (short, long) = ActionTimeouts::IOS.waiters(&clock);
        Self {
            driver,
            detector: ScreenStabilityDetector::new(StabilityPolicy::ios(), clock.clone()),
            clock,
            short,
            long,
            sink: ScreenshotSink::from_env(&Environment::from_process()),
        }
    }

    /// Write screenshots through `sink`
    #[must_use]
    pub fn with_sink(mut self, sink: ScreenshotSink) -> Self {
        self.sink = sink;
        self
    }

    /// Override the timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: ActionTimeouts) -> Self {
        let (short, long) = timeouts.waiters(&self.clock);
        self.short = short;
        self.long = long;
        self
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &'a dyn AutomationDriver {
        self.driver
    }

    // =========================================================================
    // WAITS AND CHECKS
    // =========================================================================

    /// Wait (long timeout) until displayed
    pub fn wait_visible(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        info!(%locator, "waiting for element to be visible");
        logged("wait_visible", locator, self.long.visible(self.driver, locator))
    }

    /// Wait (long timeout) until in the tree
    pub fn wait_present(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        info!(%locator, "waiting for element to be present");
        logged("wait_present", locator, self.long.present(self.driver, locator))
    }

    /// Wait (long timeout) until displayed and enabled
    pub fn wait_clickable(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        info!(%locator, "waiting for element to be clickable");
        logged("wait_clickable", locator, self.long.clickable(self.driver, locator))
    }

    /// Whether the element becomes visible within the default timeout
    pub fn is_visible(&self, locator: &Locator) -> PepeniumResult<bool> {
        match self.short.visible(self.driver, locator) {
            Ok(_) => Ok(true),
            Err(PepeniumError::Timeout { .. }) => {
                debug!(%locator, "not visible in time");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the element text comes to contain `expected`
    pub fn wait_for_text(&self, locator: &Locator, expected: &str) -> PepeniumResult<bool> {
        let condition = Condition::TextContains(expected.to_string());
        probe(
            "wait_for_text",
            locator,
            self.short.for_condition(self.driver, locator, &condition),
        )
    }

    /// Whether the element disappears (hidden or removed) within the long timeout
    pub fn wait_gone(&self, locator: &Locator) -> PepeniumResult<bool> {
        probe("wait_gone", locator, self.long.gone(self.driver, locator))
    }

    /// Text of the visible element, `None` when it cannot be read
    pub fn element_text(&self, locator: &Locator) -> Option<String> {
        text_of(self.driver, &self.long, locator, true)
    }

    /// Stability wait with the iOS policy
    pub fn wait_stable(&self) -> bool {
        self.detector.wait_stable(self.driver).stable
    }

    // =========================================================================
    // INTERACTIONS
    // =========================================================================

    /// Click once clickable; an intercepted click is retried as a tap at the
    /// element centre
    pub fn click(&self, locator: &Locator) -> PepeniumResult<()> {
        let element = self.wait_clickable(locator)?;
        match self.driver.click(&element) {
            Ok(()) => {
                info!(%locator, "click performed");
                Ok(())
            }
            Err(PepeniumError::ClickIntercepted { .. }) => {
                warn!(%locator, "click intercepted, tapping element centre");
                let element = self.wait_visible(locator)?;
                let center = self.driver.element_rect(&element)?.center();
                self.tap_point(center)
            }
            Err(e) => logged("click", locator, Err(e)),
        }
    }

    /// Click only when the element becomes visible; returns whether it did
    pub fn click_if_visible(&self, locator: &Locator) -> PepeniumResult<bool> {
        if self.is_visible(locator)? {
            self.click(locator)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Settle, then clear the field and type `text`
    pub fn send_text(&self, locator: &Locator, text: &str) -> PepeniumResult<()> {
        self.wait_stable();
        let result = self.wait_visible(locator).and_then(|el| {
            self.driver.clear(&el)?;
            self.driver.send_keys(&el, text)
        });
        logged("send_text", locator, result)?;
        info!(%locator, text, "text sent");
        Ok(())
    }

    /// Wait for a loader to go away; it may never show up at all
    pub fn wait_loading(&self, indicator: &Locator) -> PepeniumResult<bool> {
        info!(%indicator, "waiting for loader to appear");
        match self.long.visible(self.driver, indicator) {
            Ok(_) => {}
            Err(PepeniumError::Timeout { .. }) => {
                warn!(%indicator, "loader never appeared");
            }
            Err(e) => return Err(e),
        }
        info!(%indicator, "waiting for loader to disappear");
        self.wait_gone(indicator)
    }

    // =========================================================================
    // GESTURES
    // =========================================================================

    /// Full-screen swipe after settling
    pub fn swipe(&self, direction: Direction) -> PepeniumResult<()> {
        self.wait_stable();
        let size = self.driver.window_size()?;
        perform_swipe(self.driver, &SwipeRatios::IOS.swipe(size, direction))
    }

    /// Swipe up
    pub fn swipe_up(&self) -> PepeniumResult<()> {
        self.swipe(Direction::Up)
    }

    /// Swipe down, then capture the screen
    pub fn swipe_down(&self) -> PepeniumResult<()> {
        self.swipe(Direction::Down)?;
        self.screenshot();
        Ok(())
    }

    /// Swipe left
    pub fn swipe_left(&self) -> PepeniumResult<()> {
        self.swipe(Direction::Left)
    }

    /// Swipe right, then capture the screen
    pub fn swipe_right(&self) -> PepeniumResult<()> {
        self.swipe(Direction::Right)?;
        self.screenshot();
        Ok(())
    }

    /// Swipe up until the element is displayed, at most `max_swipes` times
    pub fn scroll_to_element(&self, locator: &Locator, max_swipes: u32) -> PepeniumResult<ElementRef> {
        for _ in 0..max_swipes {
            if let Ok(el) = self.driver.find_element(locator) {
                if self.driver.is_displayed(&el).unwrap_or(false) {
                    return Ok(el);
                }
            }
            self.swipe_up()?;
        }
        Err(PepeniumError::NotFound {
            locator: locator.to_string(),
            attempts: max_swipes,
        })
    }

    /// Scroll with the stagnation-aware resolver
    pub fn safe_scroll(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        ScrollResolver::new(self.driver).scroll_to(locator, SAFE_SCROLL_ATTEMPTS)
    }

    /// Swipe `times` times from the element centre with the iOS margins
    pub fn swipe_at_element(
        &self,
        locator: &Locator,
        direction: Direction,
        times: u32,
        percent: f64,
        duration: Duration,
    ) -> PepeniumResult<()> {
        self.wait_stable();
        let element = self.wait_visible(locator)?;
        let rect = self.driver.element_rect(&element)?;
        let window = self.driver.window_size()?;
        let swipe = swipe_at_element(rect, window, direction, percent, duration, ElementSwipeLimits::IOS);
        for _ in 0..times {
            perform_swipe(self.driver, &swipe)?;
            info!(%direction, %locator, from = ?swipe.from, to = ?swipe.to, "swipe at element");
        }
        Ok(())
    }

    /// Tap the middle of the screen
    pub fn tap_center(&self) -> PepeniumResult<()> {
        let center = self.driver.window_size()?.center();
        self.tap_point(center)
    }

    fn tap_point(&self, at: Point) -> PepeniumResult<()> {
        debug!(?at, "tap");
        self.driver.perform_actions(&[tap(at)])
    }

    // =========================================================================
    // SCREENSHOTS
    // =========================================================================

    /// Settle and save a screenshot; `None` when it could not be taken
    pub fn screenshot(&self) -> Option<PathBuf> {
        self.wait_stable();
        save_screenshot(self.driver, &self.sink)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::input::InputStep;
    use crate::locator::{Rect, Size};
    use crate::mock::{Failure, Lookup, ScriptedDriver};

    fn actions<'a>(driver: &'a ScriptedDriver, clock: &FakeClock, dir: &std::path::Path) -> IosActions<'a> {
        IosActions::new(driver, clock.shared()).with_sink(ScreenshotSink::new(dir))
    }

    #[test]
    fn test_intercepted_click_falls_back_to_tap() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::accessibility_id("Continue");
        driver
            .place(&loc, "b1")
            .script_clicks("b1", vec![Err(Failure::Intercepted)])
            .script_rects("b1", vec![Ok(Rect::new(100, 200, 80, 40))]);

        actions(&driver, &clock, tmp.path()).click(&loc).unwrap();

        let performed = driver.performed();
        assert_eq!(performed.len(), 1);
        let steps = &performed[0][0].steps;
        assert_eq!(
            steps[0],
            InputStep::PointerMove {
                to: Point::new(140, 220),
                duration: Duration::ZERO
            }
        );
        assert!(steps.contains(&InputStep::Pause(Duration::from_millis(80))));
    }

    #[test]
    fn test_other_click_errors_propagate() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::id("b");
        driver
            .place(&loc, "b1")
            .script_clicks("b1", vec![Err(Failure::Other("crashed".into()))]);
        assert!(actions(&driver, &clock, tmp.path()).click(&loc).is_err());
        assert!(driver.performed().is_empty());
    }

    #[test]
    fn test_short_timeout_and_fast_polling() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        assert!(!actions(&driver, &clock, tmp.path()).is_visible(&Locator::id("x")).unwrap());
        assert_eq!(clock.now_ms(), 10_000);
        // 10 s / 60 ms, rounded up
        assert_eq!(clock.sleep_count(), 167);
    }

    #[test]
    fn test_wait_for_text_contains() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::predicate("name == 'status'");
        driver.place(&loc, "s").script_text("s", &["Order 42 confirmed"]);
        assert!(actions(&driver, &clock, tmp.path()).wait_for_text(&loc, "confirmed").unwrap());
    }

    #[test]
    fn test_loader_that_never_appears_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::predicate("type == 'XCUIElementTypeActivityIndicator'");
        assert!(actions(&driver, &clock, tmp.path()).wait_loading(&loc).unwrap());
        assert_eq!(clock.now_ms(), 25_000);
    }

    #[test]
    fn test_wait_gone_false_when_stuck() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::id("toast");
        driver.place(&loc, "t");
        assert!(!actions(&driver, &clock, tmp.path()).wait_gone(&loc).unwrap());
    }

    #[test]
    fn test_tap_center() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        driver.set_window(Size::new(390, 844));
        let clock = FakeClock::new();
        actions(&driver, &clock, tmp.path()).tap_center().unwrap();
        assert_eq!(
            driver.performed()[0][0].steps[0],
            InputStep::PointerMove {
                to: Point::new(195, 422),
                duration: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_swipe_at_element_ios_limits() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        driver.set_window(Size::new(390, 844));
        let clock = FakeClock::new();
        let loc = Locator::id("list");
        driver
            .place(&loc, "l")
            .script_rects("l", vec![Ok(Rect::new(0, 810, 390, 20))]);
        actions(&driver, &clock, tmp.path())
            .swipe_at_element(&loc, Direction::Down, 1, 0.1, Duration::from_millis(100))
            .unwrap();
        let steps = &driver.performed()[0][0].steps;
        assert_eq!(
            steps[2],
            InputStep::PointerMove {
                to: Point::new(195, 824),
                duration: Duration::from_millis(400)
            }
        );
    }

    #[test]
    fn test_safe_scroll_budget() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let pages: Vec<_> = (0..40).map(|i| Ok(format!("<page n='{i}'/>"))).collect();
        driver.script_page_sources(pages);
        let err = actions(&driver, &clock, tmp.path())
            .safe_scroll(&Locator::id("never"))
            .unwrap_err();
        assert!(matches!(err, PepeniumError::NotFound { attempts: 12, .. }));
        assert_eq!(driver.call_count("perform_actions"), 12);
    }

    #[test]
    fn test_scroll_to_element_found_later() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::ios();
        let clock = FakeClock::new();
        let loc = Locator::id("row-9");
        driver.script_lookup(&loc, vec![Lookup::Missing, Lookup::Missing, Lookup::found("r9")]);
        let el = actions(&driver, &clock, tmp.path()).scroll_to_element(&loc, 4).unwrap();
        assert_eq!(el.id, "r9");
        assert_eq!(driver.call_count("perform_actions"), 2);
    }
}
