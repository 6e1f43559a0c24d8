//! Live-session commands: `screenshot` and `find`

use std::path::Path;
use tracing::info;

use pepenium::capabilities::Platform;
use pepenium::{
    profile_by_name, AutomationDriver, Environment, Locator, QuickSettle, ScreenStabilityDetector,
    ScreenshotSink, ScrollResolver, SharedClock, StabilityPolicy, SuiteSession, SystemClock,
};

use crate::commands::{FindArgs, ScreenshotArgs};
use crate::error::{CliError, CliResult};
use crate::output::Output;

/// Stability policy for the session platform; browsers have none
#[must_use]
pub fn policy_for(platform: &Platform) -> Option<StabilityPolicy> {
    match platform {
        Platform::Android => Some(StabilityPolicy::android()),
        Platform::Ios => Some(StabilityPolicy::ios()),
        Platform::Other(_) => None,
    }
}

/// Let the screen settle, then write a screenshot
pub fn settle_and_capture(
    driver: &dyn AutomationDriver,
    clock: SharedClock,
    sink: &ScreenshotSink,
) -> CliResult<std::path::PathBuf> {
    if let Some(policy) = policy_for(&driver.platform()) {
        let report = ScreenStabilityDetector::new(policy, clock.clone()).wait_stable(driver);
        info!(stable = report.stable, samples = report.samples, "settled");
    }
    let quiet = QuickSettle::new(clock).settle(driver);
    info!(quiet, "page source checked");
    Ok(sink.capture(driver)?)
}

/// Open a session, capture the settled screen and quit
pub fn execute_screenshot(args: &ScreenshotArgs, config_dir: &Path, out: &Output) -> CliResult<()> {
    let env = Environment::from_process();
    let sink = args
        .output
        .as_ref()
        .map_or_else(|| ScreenshotSink::from_env(&env), ScreenshotSink::new);
    let mut session = SuiteSession::new(profile_by_name(&args.profile, &env, config_dir)?);
    session.setup()?;
    let captured = settle_and_capture(session.driver()?, SystemClock::shared(), &sink);
    session.teardown()?;
    let path = captured?;
    out.success("screenshot saved");
    out.data(&path.display().to_string());
    Ok(())
}

/// Resolve `locator` with the scroll resolver and describe the match
pub fn find_element(
    driver: &dyn AutomationDriver,
    locator: &Locator,
    max_swipes: u32,
) -> CliResult<String> {
    let element = ScrollResolver::new(driver).scroll_to(locator, max_swipes)?;
    let rect = driver.element_rect(&element)?;
    Ok(format!(
        "{element} at ({}, {}) size {}x{}",
        rect.x, rect.y, rect.width, rect.height
    ))
}

/// Open a session and scroll until the element is visible
pub fn execute_find(args: &FindArgs, config_dir: &Path, out: &Output) -> CliResult<()> {
    let locator: Locator = args
        .locator
        .parse()
        .map_err(|e: pepenium::PepeniumError| CliError::invalid_argument(e.to_string()))?;
    let env = Environment::from_process();
    let mut session = SuiteSession::new(profile_by_name(&args.profile, &env, config_dir)?);
    session.setup()?;
    let found = find_element(session.driver()?, &locator, args.max_swipes);
    session.teardown()?;
    let description = found?;
    out.success(&format!("found {locator}"));
    out.data(&description);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pepenium::locator::Rect;
    use pepenium::mock::Lookup;
    use pepenium::{FakeClock, ScriptedDriver};

    #[test]
    fn test_policy_per_platform() {
        assert_eq!(policy_for(&Platform::Ios), Some(StabilityPolicy::ios()));
        assert_eq!(policy_for(&Platform::Android), Some(StabilityPolicy::android()));
        assert!(policy_for(&Platform::Other("chrome".into())).is_none());
    }

    #[test]
    fn test_settle_and_capture_web() {
        let dir = tempfile::tempdir().unwrap();
        let driver = ScriptedDriver::web();
        let clock = FakeClock::new();
        let path = settle_and_capture(&driver, clock.shared(), &ScreenshotSink::new(dir.path())).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(!driver.was_called("element_rect"));
    }

    #[test]
    fn test_find_element_describes_match() {
        let driver = ScriptedDriver::ios();
        let loc = Locator::accessibility_id("Pay");
        driver
            .script_lookup(&loc, vec![Lookup::found("p")])
            .script_rects("p", vec![Ok(Rect::new(10, 700, 370, 48))]);
        let text = find_element(&driver, &loc, 3).unwrap();
        assert_eq!(text, "element(p) at (10, 700) size 370x48");
    }

    #[test]
    fn test_find_element_not_found() {
        let driver = ScriptedDriver::ios();
        let err = find_element(&driver, &Locator::accessibility_id("Gone"), 2).unwrap_err();
        assert!(err.to_string().contains("Element not found after 2 scroll attempts"));
    }
}
