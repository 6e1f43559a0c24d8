//! Screen settle heuristics.
//!
//! [`ScreenStabilityDetector`] decides whether a remote UI has finished
//! rendering by sampling a root container rectangle and a spinner query.
//! [`QuickSettle`] is the cheap page-source check used right before a
//! screenshot.
//!
//! Both are best effort: they never fail the caller and never sleep past their
//! ceiling.

use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::SharedClock;
use crate::driver::AutomationDriver;
use crate::locator::{Locator, Rect};
use crate::result::PepeniumResult;

/// Consecutive unchanged samples required by the presets
pub const STABLE_THRESHOLD: u32 = 3;

// =============================================================================
// POLICY
// =============================================================================

/// Sampling policy for the stability detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityPolicy {
    /// Root container whose rectangle is sampled
    pub root: Locator,
    /// Loading indicator; any match counts as visible
    pub spinner: Locator,
    /// Pause between rectangle samples
    pub interval: Duration,
    /// Pause after seeing a spinner
    pub spinner_interval: Duration,
    /// Total time budget
    pub ceiling: Duration,
    /// Consecutive unchanged samples needed
    pub threshold: u32,
    /// Sample the window rectangle when the root cannot be read
    pub viewport_fallback: bool,
}

impl StabilityPolicy {
    /// Android: `android:id/content` root, `ProgressBar` spinner
    #[must_use]
    pub fn android() -> Self {
        Self {
            root: Locator::ui_automator("new UiSelector().resourceId(\"android:id/content\")"),
            spinner: Locator::ui_automator(
                "new UiSelector().className(\"android.widget.ProgressBar\")",
            ),
            interval: Duration::from_millis(1500),
            spinner_interval: Duration::from_millis(1500),
            ceiling: Duration::from_secs(2),
            threshold: STABLE_THRESHOLD,
            viewport_fallback: false,
        }
    }

    /// iOS: first window root, visible activity indicator spinner
    #[must_use]
    pub fn ios() -> Self {
        Self {
            root: Locator::class_chain("**/XCUIElementTypeWindow[1]"),
            spinner: Locator::predicate(
                "type == 'XCUIElementTypeActivityIndicator' AND visible == 1",
            ),
            interval: Duration::from_millis(250),
            spinner_interval: Duration::from_millis(200),
            ceiling: Duration::from_secs(3),
            threshold: STABLE_THRESHOLD,
            viewport_fallback: true,
        }
    }

    /// Override the ceiling
    #[must_use]
    pub const fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Override the sample interval
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

// =============================================================================
// PROBE
// =============================================================================

/// The two queries the detector samples
pub trait StabilityProbe {
    /// Whether a loading indicator is showing
    fn spinner_visible(&self) -> PepeniumResult<bool>;

    /// Rectangle of the root container
    fn root_rect(&self) -> PepeniumResult<Rect>;

    /// Rectangle of the whole window, used as fallback sample
    fn viewport_rect(&self) -> PepeniumResult<Rect>;
}

/// Probe backed by a driver and the policy's locators
#[derive(Debug)]
pub struct DriverProbe<'a> {
    driver: &'a dyn AutomationDriver,
    root: &'a Locator,
    spinner: &'a Locator,
}

impl<'a> DriverProbe<'a> {
    /// Probe `driver` with the locators of `policy`
    #[must_use]
    pub fn new(driver: &'a dyn AutomationDriver, policy: &'a StabilityPolicy) -> Self {
        Self {
            driver,
            root: &policy.root,
            spinner: &policy.spinner,
        }
    }
}

impl StabilityProbe for DriverProbe<'_> {
    fn spinner_visible(&self) -> PepeniumResult<bool> {
        Ok(!self.driver.find_elements(self.spinner)?.is_empty())
    }

    fn root_rect(&self) -> PepeniumResult<Rect> {
        let root = self.driver.find_element(self.root)?;
        self.driver.element_rect(&root)
    }

    fn viewport_rect(&self) -> PepeniumResult<Rect> {
        Ok(Rect::from_size(self.driver.window_size()?))
    }
}

// =============================================================================
// DETECTOR
// =============================================================================

/// Outcome of a stability wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityReport {
    /// Threshold reached before the ceiling
    pub stable: bool,
    /// Samples taken, spinner checks included
    pub samples: u32,
    /// Time spent
    pub elapsed: Duration,
}

enum Sample {
    Spinner,
    Rect(Rect),
    Failed,
}

/// Polls a probe until the layout stops changing or the ceiling is hit
#[derive(Debug, Clone)]
pub struct ScreenStabilityDetector {
    policy: StabilityPolicy,
    clock: SharedClock,
}

impl ScreenStabilityDetector {
    /// Create a detector
    #[must_use]
    pub fn new(policy: StabilityPolicy, clock: SharedClock) -> Self {
        Self { policy, clock }
    }

    /// Policy in use
    #[must_use]
    pub const fn policy(&self) -> &StabilityPolicy {
        &self.policy
    }

    /// Sample `driver` with the policy's locators
    pub fn wait_stable(&self, driver: &dyn AutomationDriver) -> StabilityReport {
        self.wait_stable_with(&DriverProbe::new(driver, &self.policy))
    }

    /// Sample an arbitrary probe
    ///
    /// A spinner, a changed rectangle or a failed sample resets the count.
    /// Returns `stable: false` once the ceiling is reached.
    pub fn wait_stable_with(&self, probe: &dyn StabilityProbe) -> StabilityReport {
        let start = self.clock.now();
        let mut previous: Option<Rect> = None;
        let mut consecutive = 0u32;
        let mut samples = 0u32;

        loop {
            let elapsed = self.clock.since(start);
            if elapsed >= self.policy.ceiling {
                info!(
                    samples,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "screen did not stabilize in time"
                );
                return StabilityReport {
                    stable: false,
                    samples,
                    elapsed,
                };
            }

            samples += 1;
            let pause = match self.sample(probe) {
                Sample::Spinner => {
                    debug!(samples, "spinner visible");
                    consecutive = 0;
                    self.policy.spinner_interval
                }
                Sample::Rect(rect) => {
                    if previous == Some(rect) {
                        consecutive += 1;
                        if consecutive >= self.policy.threshold {
                            let elapsed = self.clock.since(start);
                            debug!(samples, elapsed_ms = elapsed.as_millis() as u64, "screen stable");
                            return StabilityReport {
                                stable: true,
                                samples,
                                elapsed,
                            };
                        }
                    } else {
                        consecutive = 0;
                    }
                    previous = Some(rect);
                    self.policy.interval
                }
                Sample::Failed => {
                    consecutive = 0;
                    self.policy.interval
                }
            };

            let remaining = self.policy.ceiling.saturating_sub(self.clock.since(start));
            self.clock.sleep(pause.min(remaining));
        }
    }

    fn sample(&self, probe: &dyn StabilityProbe) -> Sample {
        match probe.spinner_visible() {
            Ok(true) => return Sample::Spinner,
            Ok(false) => {}
            Err(e) => {
                debug!(error = %e, "spinner query failed");
                return Sample::Failed;
            }
        }
        match probe.root_rect() {
            Ok(rect) => Sample::Rect(rect),
            Err(e) if self.policy.viewport_fallback && !e.is_stale() => {
                debug!(error = %e, "root unreadable, sampling viewport");
                probe.viewport_rect().map_or(Sample::Failed, Sample::Rect)
            }
            Err(e) => {
                debug!(error = %e, "root sample failed");
                Sample::Failed
            }
        }
    }
}

// =============================================================================
// QUICK SETTLE
// =============================================================================

/// Characters of page source hashed by [`QuickSettle`]
pub const QUICK_SETTLE_PREFIX: usize = 5000;

/// Two page-source hashes a short gap apart, plus a micro-settle if they differ
#[derive(Debug, Clone)]
pub struct QuickSettle {
    clock: SharedClock,
    gap: Duration,
    settle: Duration,
}

impl QuickSettle {
    /// 100 ms gap, 150 ms micro-settle
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            gap: Duration::from_millis(100),
            settle: Duration::from_millis(150),
        }
    }

    /// Returns whether the page source was already quiet
    pub fn settle(&self, driver: &dyn AutomationDriver) -> bool {
        let first = prefix_hash(driver);
        self.clock.sleep(self.gap);
        let second = prefix_hash(driver);
        if first == second {
            true
        } else {
            debug!("page source still changing, micro-settle");
            self.clock.sleep(self.settle);
            false
        }
    }
}

fn prefix_hash(driver: &dyn AutomationDriver) -> Vec<u8> {
    let source = driver.page_source().unwrap_or_default();
    let prefix: String = source.chars().take(QUICK_SETTLE_PREFIX).collect();
    Sha256::digest(prefix.as_bytes()).to_vec()
}
