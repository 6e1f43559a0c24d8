//! Browser actions.

use rand::Rng;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{logged, probe, save_screenshot, text_of, ActionTimeouts};
use crate::clock::SharedClock;
use crate::config::env::Environment;
use crate::driver::{AutomationDriver, ElementRef};
use crate::gesture::escape;
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};
use crate::screenshot::ScreenshotSink;
use crate::wait::{Condition, WaitOptions, Waiter};

/// Pause after every [`WebActions::click`]
pub const DEFAULT_POST_CLICK_PAUSE: Duration = Duration::from_secs(2);

/// Open sheet overlay
pub const SHEET_OVERLAY: &str = "[data-slot='sheet-overlay'][data-state='open']";

/// Close button of an open sheet
pub const SHEET_CLOSE: &str = "[data-slot='sheet-close'], [data-state='open'] [aria-label='Close'], button[data-slot='sheet-close']";

const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block:'center'});";
const SCROLL_INTO_VIEW_INSTANT: &str =
    "arguments[0].scrollIntoView({block:'center', behavior:'instant'});";
const JS_CLICK: &str = "arguments[0].click();";
const SCROLL_BY: &str = "window.scrollBy(0, arguments[0]);";

const FOUND_VISIBLE_TIMEOUT: Duration = Duration::from_secs(2);
const CENTER_PAUSE: Duration = Duration::from_millis(300);
const SCROLL_PAUSE: Duration = Duration::from_millis(400);

/// Interactions with a web page
#[derive(Debug)]
pub struct WebActions<'a> {
    driver: &'a dyn AutomationDriver,
    clock: SharedClock,
    short: Waiter,
    long: Waiter,
    post_click_pause: Duration,
    sink: ScreenshotSink,
}

impl<'a> WebActions<'a> {
    /// Actions over `driver`
    #[must_use]
    pub fn new(driver: &'a dyn AutomationDriver, clock: SharedClock) -> Self {
        let (short, long) = ActionTimeouts::WEB.waiters(&clock);
        Self {
            driver,
            clock,
            short,
            long,
            post_click_pause: DEFAULT_POST_CLICK_PAUSE,
            sink: ScreenshotSink::from_env(&Environment::from_process()),
        }
    }

    /// Write screenshots through `sink`
    #[must_use]
    pub fn with_sink(mut self, sink: ScreenshotSink) -> Self {
        self.sink = sink;
        self
    }

    /// Pause after clicks, zero to disable
    #[must_use]
    pub const fn with_post_click_pause(mut self, pause: Duration) -> Self {
        self.post_click_pause = pause;
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
    // OVERLAYS
    // =========================================================================

    /// Wait until a sheet overlay is open
    pub fn wait_overlay_open(&self) -> PepeniumResult<ElementRef> {
        self.short.visible(self.driver, &Locator::css(SHEET_OVERLAY))
    }

    /// Close an open sheet overlay with its close button, or Escape
    ///
    /// Returns whether an overlay was open.
    pub fn close_sheet_if_open(&self) -> PepeniumResult<bool> {
        let overlay = Locator::css(SHEET_OVERLAY);
        if self.driver.find_elements(&overlay)?.is_empty() {
            return Ok(false);
        }
        if let Err(e) = self.click(&Locator::css(SHEET_CLOSE)) {
            debug!(error = %e, "no close button, pressing Escape");
            self.driver.perform_actions(&[escape()])?;
        }
        self.short.until("sheet overlay to close", || {
            Ok(self.driver.find_elements(&overlay)?.is_empty().then_some(()))
        })?;
        info!("sheet overlay closed");
        Ok(true)
    }

    // =========================================================================
    // WAITS AND CHECKS
    // =========================================================================

    /// Wait until at least `n` elements match
    pub fn wait_at_least(&self, locator: &Locator, n: usize) -> PepeniumResult<Vec<ElementRef>> {
        logged(
            "wait_at_least",
            locator,
            self.short
                .for_condition(self.driver, locator, &Condition::AtLeast(n)),
        )
    }

    /// Wait until displayed
    pub fn wait_visible(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        logged("wait_visible", locator, self.short.visible(self.driver, locator))
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

    /// Wait (long timeout) until in the DOM
    pub fn wait_present(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        info!(%locator, "waiting for element to be present");
        let element = logged("wait_present", locator, self.long.present(self.driver, locator))?;
        info!(%locator, "element is present");
        Ok(element)
    }

    /// Whether the element is in the DOM right now
    pub fn is_present(&self, locator: &Locator) -> PepeniumResult<bool> {
        Ok(!self.driver.find_elements(locator)?.is_empty())
    }

    /// Whether the element becomes visible within the default timeout
    pub fn is_visible(&self, locator: &Locator) -> PepeniumResult<bool> {
        probe("is_visible", locator, self.short.visible(self.driver, locator))
    }

    /// Text of the visible element, `None` when it cannot be read
    pub fn element_text(&self, locator: &Locator) -> Option<String> {
        text_of(self.driver, &self.short, locator, true)
    }

    // =========================================================================
    // INTERACTIONS
    // =========================================================================

    /// Wait until clickable, click, then pause
    pub fn click(&self, locator: &Locator) -> PepeniumResult<()> {
        let result = self
            .short
            .clickable(self.driver, locator)
            .and_then(|el| self.driver.click(&el));
        logged("click", locator, result)?;
        self.clock.sleep(self.post_click_pause);
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

    /// Wait for at least one match and return them all
    pub fn collect_all(&self, locator: &Locator) -> PepeniumResult<Vec<ElementRef>> {
        self.wait_at_least(locator, 1)?;
        self.driver.find_elements(locator)
    }

    /// Number of matches, waiting for at least one
    pub fn count(&self, locator: &Locator) -> PepeniumResult<usize> {
        Ok(self.collect_all(locator)?.len())
    }

    /// Click the `index`-th match
    pub fn click_by_index(&self, locator: &Locator, index: usize) -> PepeniumResult<()> {
        let elements = self.collect_all(locator)?;
        let Some(target) = elements.get(index) else {
            return Err(PepeniumError::invalid_argument(format!(
                "Index out of range: {index} (size={})",
                elements.len()
            )));
        };
        self.click_with_fallback(target, locator, index)
    }

    /// Click a random match; returns the index picked
    pub fn click_random(&self, locator: &Locator) -> PepeniumResult<usize> {
        let elements = self.collect_all(locator)?;
        if elements.is_empty() {
            return Err(PepeniumError::NoSuchElement {
                locator: locator.to_string(),
            });
        }
        let index = rand::thread_rng().gen_range(0..elements.len());
        self.click_with_fallback(&elements[index], locator, index)?;
        Ok(index)
    }

    /// Scroll the element into view and click it; fall back to a script click
    pub fn click_with_fallback(
        &self,
        element: &ElementRef,
        locator: &Locator,
        index: usize,
    ) -> PepeniumResult<()> {
        let native = self
            .driver
            .execute_script(SCROLL_INTO_VIEW, vec![element.to_json()])
            .and_then(|_| {
                self.short.until("element to be clickable", || {
                    let ready =
                        self.driver.is_displayed(element)? && self.driver.is_enabled(element)?;
                    Ok(ready.then_some(()))
                })
            })
            .and_then(|()| self.driver.click(element));
        match native {
            Ok(()) => info!(%locator, index, "click by index"),
            Err(e) => {
                warn!(%locator, index, error = %e, "native click failed, using script click");
                self.driver.execute_script(JS_CLICK, vec![element.to_json()])?;
                info!(%locator, index, "script click performed");
            }
        }
        Ok(())
    }

    /// Wait until visible, clear and type `text`
    pub fn send_text(&self, locator: &Locator, text: &str) -> PepeniumResult<()> {
        let result = self.wait_visible(locator).and_then(|el| {
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

    /// Scroll the page by `step_px` until the element exists, then centre and
    /// click it
    ///
    /// An element that exists but is not yet visible costs an attempt without
    /// scrolling.
    pub fn scroll_until_found_and_click(
        &self,
        locator: &Locator,
        max_scrolls: u32,
        step_px: i64,
    ) -> PepeniumResult<()> {
        let visible_wait = Waiter::new(
            self.clock.clone(),
            WaitOptions::new().with_timeout(FOUND_VISIBLE_TIMEOUT),
        );
        for attempt in 0..max_scrolls {
            match self.driver.find_element(locator) {
                Ok(element) => {
                    let shown = visible_wait.until("found element to be visible", || {
                        Ok(self.driver.is_displayed(&element)?.then_some(()))
                    });
                    match shown {
                        Ok(()) => {
                            self.driver
                                .execute_script(SCROLL_INTO_VIEW_INSTANT, vec![element.to_json()])?;
                            self.clock.sleep(CENTER_PAUSE);
                            self.driver.click(&element)?;
                            info!(%locator, scrolls = attempt, "click after scrolling");
                            return Ok(());
                        }
                        Err(PepeniumError::Timeout { .. }) => {
                            debug!(%locator, attempt = attempt + 1, "found but not visible yet");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(PepeniumError::NoSuchElement { .. }) => {
                    self.driver.execute_script(SCROLL_BY, vec![json!(step_px)])?;
                    debug!(scroll = attempt + 1, step_px, "scrolled");
                    self.clock.sleep(SCROLL_PAUSE);
                }
                Err(e) => return Err(e),
            }
        }
        Err(PepeniumError::NotFound {
            locator: locator.to_string(),
            attempts: max_scrolls,
        })
    }

    // =========================================================================
    // SCREENSHOTS
    // =========================================================================

    /// Save a screenshot; `None` when it could not be taken
    pub fn screenshot(&self) -> Option<PathBuf> {
        save_screenshot(self.driver, &self.sink)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::input::InputStep;
    use crate::mock::{Failure, Lookup, ScriptedDriver};

    fn actions<'a>(driver: &'a ScriptedDriver, clock: &FakeClock, dir: &std::path::Path) -> WebActions<'a> {
        WebActions::new(driver, clock.shared()).with_sink(ScreenshotSink::new(dir))
    }

    mod click_tests {
        use super::*;

        #[test]
        fn test_click_pauses_afterwards() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("button.buy");
            driver.place(&loc, "b");
            actions(&driver, &clock, tmp.path()).click(&loc).unwrap();
            assert_eq!(clock.now_ms(), 2000);

            let clock = FakeClock::new();
            actions(&driver, &clock, tmp.path())
                .with_post_click_pause(Duration::ZERO)
                .click(&loc)
                .unwrap();
            assert_eq!(clock.now_ms(), 0);
        }

        #[test]
        fn test_click_by_index_out_of_range() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("li.chip");
            driver.script_lookup(&loc, vec![Lookup::many(&["a", "b", "c"])]);
            let err = actions(&driver, &clock, tmp.path())
                .click_by_index(&loc, 3)
                .unwrap_err();
            assert!(matches!(err, PepeniumError::InvalidArgument { .. }));
            assert_eq!(err.to_string(), "Invalid argument: Index out of range: 3 (size=3)");
        }

        #[test]
        fn test_click_by_index_scrolls_into_view() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("li.chip");
            driver.script_lookup(&loc, vec![Lookup::many(&["a", "b", "c"])]);
            actions(&driver, &clock, tmp.path()).click_by_index(&loc, 1).unwrap();
            assert!(driver.was_called(&format!("execute_script:{SCROLL_INTO_VIEW}")));
            assert!(driver.was_called("click:b"));
            assert!(!driver.was_called(&format!("execute_script:{JS_CLICK}")));
        }

        #[test]
        fn test_script_click_fallback() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("li.chip");
            driver
                .script_lookup(&loc, vec![Lookup::many(&["a"])])
                .script_clicks("a", vec![Err(Failure::Intercepted)]);
            actions(&driver, &clock, tmp.path()).click_by_index(&loc, 0).unwrap();
            assert!(driver.was_called(&format!("execute_script:{JS_CLICK}")));
        }

        #[test]
        fn test_click_random_in_range() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("li.chip");
            driver.script_lookup(&loc, vec![Lookup::many(&["a", "b", "c", "d"])]);
            let web = actions(&driver, &clock, tmp.path());
            for _ in 0..10 {
                assert!(web.click_random(&loc).unwrap() < 4);
            }
            assert_eq!(driver.call_count("click:"), 10);
        }

        #[test]
        fn test_count_waits_for_first() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("article");
            driver.script_lookup(&loc, vec![Lookup::Missing, Lookup::many(&["x", "y"])]);
            assert_eq!(actions(&driver, &clock, tmp.path()).count(&loc).unwrap(), 2);
            assert_eq!(clock.now_ms(), 500);
        }
    }

    mod overlay_tests {
        use super::*;

        #[test]
        fn test_no_overlay_is_noop() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            assert!(!actions(&driver, &clock, tmp.path()).close_sheet_if_open().unwrap());
            assert_eq!(driver.history().len(), 1);
        }

        #[test]
        fn test_close_button_used() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            driver
                .script_lookup(
                    &Locator::css(SHEET_OVERLAY),
                    vec![Lookup::found("ov"), Lookup::Missing],
                )
                .place(&Locator::css(SHEET_CLOSE), "close");
            assert!(actions(&driver, &clock, tmp.path()).close_sheet_if_open().unwrap());
            assert!(driver.was_called("click:close"));
            assert!(driver.performed().is_empty());
        }

        #[test]
        fn test_escape_fallback() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            driver.script_lookup(
                &Locator::css(SHEET_OVERLAY),
                vec![Lookup::found("ov"), Lookup::Missing],
            );
            assert!(actions(&driver, &clock, tmp.path()).close_sheet_if_open().unwrap());
            let performed = driver.performed();
            assert_eq!(performed.len(), 1);
            assert!(performed[0][0]
                .steps
                .contains(&InputStep::KeyDown(crate::input::KEY_ESCAPE.to_string())));
        }
    }

    mod scroll_tests {
        use super::*;

        #[test]
        fn test_scrolls_until_found() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("#footer-link");
            driver.script_lookup(
                &loc,
                vec![Lookup::Missing, Lookup::Missing, Lookup::found("f")],
            );
            actions(&driver, &clock, tmp.path())
                .scroll_until_found_and_click(&loc, 5, 600)
                .unwrap();
            assert_eq!(driver.call_count(&format!("execute_script:{SCROLL_BY}")), 2);
            assert!(driver.was_called("click:f"));
            assert_eq!(clock.now_ms(), 400 + 400 + 300);
        }

        #[test]
        fn test_gives_up_after_budget() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("#never");
            let err = actions(&driver, &clock, tmp.path())
                .scroll_until_found_and_click(&loc, 3, 600)
                .unwrap_err();
            assert!(matches!(err, PepeniumError::NotFound { attempts: 3, .. }));
            assert_eq!(driver.call_count(&format!("execute_script:{SCROLL_BY}")), 3);
        }

        #[test]
        fn test_hidden_element_costs_attempt_without_scroll() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = ScriptedDriver::web();
            let clock = FakeClock::new();
            let loc = Locator::css("#lazy");
            driver
                .place(&loc, "z")
                .script_displayed("z", vec![Ok(false); 5].into_iter().chain([Ok(true)]).collect());
            actions(&driver, &clock, tmp.path())
                .scroll_until_found_and_click(&loc, 3, 600)
                .unwrap();
            assert!(!driver.was_called(&format!("execute_script:{SCROLL_BY}")));
            assert!(driver.was_called("click:z"));
        }
    }

    #[test]
    fn test_send_text_and_screenshot() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::web();
        let clock = FakeClock::new();
        let loc = Locator::css("input[name='q']");
        driver.place(&loc, "q");
        let web = actions(&driver, &clock, tmp.path());
        web.send_text(&loc, "rust").unwrap();
        assert_eq!(driver.typed(), vec![("q".to_string(), "rust".to_string())]);
        let path = web.screenshot().unwrap();
        assert!(path.starts_with(tmp.path()));
    }
}
