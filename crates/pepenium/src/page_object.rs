//! Page Object Model support.
//!
//! A page object groups the locators of one logical screen and delegates its
//! interactions to an actions facade:
//!
//! ```rust
//! use pepenium::{AppActions, Locator, PageObject, PepeniumResult};
//!
//! struct LoginPage<'a> {
//!     actions: AppActions<'a>,
//! }
//!
//! fn user_field() -> Locator {
//!     Locator::id("user")
//! }
//!
//! impl LoginPage<'_> {
//!     fn login(&self, user: &str) -> PepeniumResult<()> {
//!         self.actions.send_text(&user_field(), user)
//!     }
//! }
//!
//! impl PageObject for LoginPage<'_> {
//!     fn ready_locator(&self) -> Locator {
//!         user_field()
//!     }
//! }
//! ```

use std::collections::HashMap;
use tracing::{debug, info};

use crate::driver::AutomationDriver;
use crate::locator::Locator;
use crate::result::{PepeniumError, PepeniumResult};
use crate::wait::Waiter;

/// A page or component of the application under test
pub trait PageObject {
    /// Locator whose presence marks the page as loaded
    fn ready_locator(&self) -> Locator;

    /// Page name for logging
    fn page_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Whether the ready locator currently matches a displayed element
    fn is_loaded(&self, driver: &dyn AutomationDriver) -> PepeniumResult<bool> {
        let locator = self.ready_locator();
        for element in driver.find_elements(&locator)? {
            match driver.is_displayed(&element) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Wait until the ready locator is visible
    fn wait_loaded(&self, driver: &dyn AutomationDriver, waiter: &Waiter) -> PepeniumResult<()> {
        let locator = self.ready_locator();
        debug!(page = self.page_name(), %locator, "waiting for page");
        waiter.visible(driver, &locator)?;
        info!(page = self.page_name(), "page loaded");
        Ok(())
    }
}

/// Builder for a [`SimplePage`]
#[derive(Debug, Clone)]
pub struct SimplePageBuilder {
    name: String,
    ready: Locator,
    locators: HashMap<String, Locator>,
}

impl SimplePageBuilder {
    /// Add a named locator
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, locator: Locator) -> Self {
        let _ = self.locators.insert(name.into(), locator);
        self
    }

    /// Build the page
    #[must_use]
    pub fn build(self) -> SimplePage {
        SimplePage {
            name: self.name,
            ready: self.ready,
            locators: self.locators,
        }
    }
}

/// Page object defined by data: a name, a ready locator and named locators
#[derive(Debug, Clone)]
pub struct SimplePage {
    name: String,
    ready: Locator,
    locators: HashMap<String, Locator>,
}

impl SimplePage {
    /// Start building a page called `name`, loaded once `ready` is displayed
    #[must_use]
    pub fn builder(name: impl Into<String>, ready: Locator) -> SimplePageBuilder {
        SimplePageBuilder {
            name: name.into(),
            ready,
            locators: HashMap::new(),
        }
    }

    /// Locator registered as `name`
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Locator registered as `name`, or an error naming the page
    pub fn require(&self, name: &str) -> PepeniumResult<&Locator> {
        self.locator(name).ok_or_else(|| {
            PepeniumError::invalid_argument(format!(
                "page '{}' has no locator named '{name}'",
                self.name
            ))
        })
    }

    /// Registered names, sorted
    #[must_use]
    pub fn locator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.locators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PageObject for SimplePage {
    fn ready_locator(&self) -> Locator {
        self.ready.clone()
    }

    fn page_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::mock::{Failure, ScriptedDriver};
    use crate::wait::WaitOptions;
    use std::time::Duration;

    fn home() -> SimplePage {
        SimplePage::builder("home", Locator::accessibility_id("home-title"))
            .with_locator("search", Locator::id("search"))
            .with_locator("cart", Locator::accessibility_id("cart"))
            .build()
    }

    #[derive(Debug)]
    struct CheckoutPage;

    impl PageObject for CheckoutPage {
        fn ready_locator(&self) -> Locator {
            Locator::id("pay")
        }
    }

    #[test]
    fn test_default_page_name_is_type_name() {
        assert_eq!(CheckoutPage.page_name(), "CheckoutPage");
        assert_eq!(home().page_name(), "home");
    }

    #[test]
    fn test_locators() {
        let page = home();
        assert_eq!(page.locator("search"), Some(&Locator::id("search")));
        assert_eq!(page.locator_names(), vec!["cart", "search"]);
        let err = page.require("login").unwrap_err();
        assert!(err.to_string().contains("page 'home' has no locator named 'login'"));
    }

    #[test]
    fn test_is_loaded() {
        let driver = ScriptedDriver::android();
        let page = home();
        assert!(!page.is_loaded(&driver).unwrap());

        driver.place(&page.ready_locator(), "t");
        assert!(page.is_loaded(&driver).unwrap());

        driver.script_displayed("t", vec![Err(Failure::Stale)]);
        assert!(!page.is_loaded(&driver).unwrap());
    }

    #[test]
    fn test_wait_loaded_times_out() {
        let driver = ScriptedDriver::android();
        let clock = FakeClock::new();
        let waiter = Waiter::new(
            clock.shared(),
            WaitOptions::new().with_timeout(Duration::from_secs(3)),
        );
        let err = CheckoutPage.wait_loaded(&driver, &waiter).unwrap_err();
        assert!(matches!(err, PepeniumError::Timeout { ms: 3000, .. }));
    }
}
