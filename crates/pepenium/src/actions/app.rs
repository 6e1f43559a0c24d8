//! Android app actions.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{logged, perform_swipe, probe, save_screenshot, text_of, ActionTimeouts};
use crate::clock::SharedClock;
use crate::config::env::Environment;
use crate::driver::{AutomationDriver, ElementRef};
use crate::gesture::{swipe_at_element, Direction, ElementSwipeLimits, SwipeRatios};
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};
use crate::screenshot::ScreenshotSink;
use crate::settle::{QuickSettle, ScreenStabilityDetector, StabilityPolicy};
use crate::wait::{Condition, Waiter};

/// Interactions with an Android app
#[derive(Debug)]
pub struct AppActions<'a> {
    driver: &'a dyn AutomationDriver,
    clock: SharedClock,
    short: Waiter,
    long: Waiter,
    detector: ScreenStabilityDetector,
    sink: ScreenshotSink,
}

impl<'a> AppActions<'a> {
    /// Actions over `driver`, screenshots go where the environment says
    #[must_use]
    pub fn new(driver: &'a dyn AutomationDriver, clock: SharedClock) -> Self {
        let (short, long) = ActionTimeouts::ANDROID.waiters(&clock);
        Self {
            driver,
            detector: ScreenStabilityDetector::new(StabilityPolicy::android(), clock.clone()),
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

    /// Wait (long timeout) until the element is in the tree
    pub fn wait_present(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        info!(%locator, "waiting for element to be present");
        let element = logged("wait_present", locator, self.long.present(self.driver, locator))?;
        info!(%locator, "element is present");
        Ok(element)
    }

    /// Whether the element text becomes exactly `expected`
    pub fn wait_for_text(&self, locator: &Locator, expected: &str) -> PepeniumResult<bool> {
        let condition = Condition::TextIs(expected.to_string());
        probe(
            "wait_for_text",
            locator,
            self.short.for_condition(self.driver, locator, &condition),
        )
    }

    /// Whether the element is in the tree right now
    pub fn is_present(&self, locator: &Locator) -> PepeniumResult<bool> {
        Ok(!self.driver.find_elements(locator)?.is_empty())
    }

    /// Whether the element becomes visible within the default timeout
    pub fn is_visible(&self, locator: &Locator) -> PepeniumResult<bool> {
        probe("is_visible", locator, self.short.visible(self.driver, locator))
    }

    /// Text of the element, `None` when it cannot be read
    pub fn element_text(&self, locator: &Locator) -> Option<String> {
        text_of(self.driver, &self.long, locator, false)
    }

    /// Stability wait with the Android policy
    pub fn wait_stable(&self) -> bool {
        self.detector.wait_stable(self.driver).stable
    }

    // =========================================================================
    // INTERACTIONS
    // =========================================================================

    /// Wait until clickable, then click
    pub fn click(&self, locator: &Locator) -> PepeniumResult<()> {
        let result = self
            .short
            .clickable(self.driver, locator)
            .and_then(|el| self.driver.click(&el));
        logged("click", locator, result)?;
        info!(%locator, "click performed");
        Ok(())
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
        let result = self.wait_present(locator).and_then(|el| {
            self.driver.clear(&el)?;
            self.driver.send_keys(&el, text)
        });
        logged("send_text", locator, result)?;
        info!(%locator, "text sent");
        Ok(())
    }

    /// Wait for a loading indicator to appear, then to disappear
    pub fn wait_loading(&self, indicator: &Locator) -> PepeniumResult<()> {
        info!(%indicator, "waiting for loading indicator");
        logged("wait_loading", indicator, self.long.visible(self.driver, indicator))?;
        info!(%indicator, "loading indicator visible");
        logged("wait_loading", indicator, self.long.gone(self.driver, indicator))?;
        info!(%indicator, "loading indicator gone");
        Ok(())
    }

    // =========================================================================
    // GESTURES
    // =========================================================================

    /// Full-screen swipe after settling
    pub fn swipe(&self, direction: Direction) -> PepeniumResult<()> {
        self.wait_stable();
        let size = self.driver.window_size()?;
        let swipe = SwipeRatios::ANDROID.swipe(size, direction);
        debug!(%direction, ?swipe, "swipe");
        perform_swipe(self.driver, &swipe)
    }

    /// Swipe up (content moves down)
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
    ///
    /// Unlike [`ScrollResolver`](crate::scroll::ScrollResolver) this never
    /// stops early.
    pub fn scroll_to_element(&self, locator: &Locator, max_swipes: u32) -> PepeniumResult<ElementRef> {
        for attempt in 0..max_swipes {
            match self.driver.find_element(locator) {
                Ok(el) => match self.driver.is_displayed(&el) {
                    Ok(true) => return Ok(el),
                    Ok(false) => {}
                    Err(e) => warn!(%locator, attempt, error = %e, "visibility check failed"),
                },
                Err(e) => debug!(%locator, attempt, error = %e, "not found yet"),
            }
            self.swipe_up()?;
        }
        Err(PepeniumError::NotFound {
            locator: locator.to_string(),
            attempts: max_swipes,
        })
    }

    /// Swipe `times` times from the element centre by `percent` of its size
    pub fn swipe_at_element(
        &self,
        locator: &Locator,
        direction: Direction,
        times: u32,
        percent: f64,
        duration: Duration,
    ) -> PepeniumResult<()> {
        self.wait_stable();
        let element = self.wait_present(locator)?;
        let rect = self.driver.element_rect(&element)?;
        let window = self.driver.window_size()?;
        let swipe = swipe_at_element(
            rect,
            window,
            direction,
            percent,
            duration,
            ElementSwipeLimits::ANDROID,
        );
        for _ in 0..times {
            perform_swipe(self.driver, &swipe)?;
            info!(%direction, %locator, from = ?swipe.from, to = ?swipe.to, "swipe at element");
        }
        Ok(())
    }

    // =========================================================================
    // SCREENSHOTS
    // =========================================================================

    /// Settle and save a screenshot; `None` when it could not be taken
    pub fn screenshot(&self) -> Option<PathBuf> {
        self.wait_stable();
        QuickSettle::new(self.clock.clone()).settle(self.driver);
        save_screenshot(self.driver, &self.sink)
    }
}
