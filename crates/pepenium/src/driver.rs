//! AutomationDriver - the seam between the toolkit and a remote session.
//!
//! Everything above this trait (waits, settle heuristics, scroll resolver,
//! action facades) talks to the device only through [`AutomationDriver`].
//! [`WebDriverSession`](crate::webdriver::WebDriverSession) speaks W3C
//! WebDriver over HTTP; [`ScriptedDriver`](crate::mock::ScriptedDriver) is the
//! in-memory stand-in used by tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::capabilities::{Capabilities, Platform};
use crate::input::ActionSequence;
use crate::locator::{Locator, Rect, Size};
use crate::result::{PepeniumError, PepeniumResult};

/// JSON key identifying a web element reference
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4ce936a91e6b";

/// Reference to an element in the remote UI tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Remote element id
    pub id: String,
}

impl ElementRef {
    /// Wrap a remote element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Parse `{"element-6066-...": "<id>"}`
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(Self::new)
    }

    /// Script argument form of this reference
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.id })
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element({})", self.id)
    }
}

/// Synchronous client-side handle to a remote automation session
pub trait AutomationDriver: fmt::Debug {
    /// All elements matching `locator`, possibly empty
    fn find_elements(&self, locator: &Locator) -> PepeniumResult<Vec<ElementRef>>;

    /// First element matching `locator`
    fn find_element(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        self.find_elements(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| PepeniumError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    /// Whether the element is rendered visibly
    fn is_displayed(&self, element: &ElementRef) -> PepeniumResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementRef) -> PepeniumResult<bool>;

    /// Element rectangle in viewport coordinates
    fn element_rect(&self, element: &ElementRef) -> PepeniumResult<Rect>;

    /// Visible text of the element
    fn element_text(&self, element: &ElementRef) -> PepeniumResult<String>;

    /// Click / tap the element
    fn click(&self, element: &ElementRef) -> PepeniumResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementRef) -> PepeniumResult<()>;

    /// Type into the element
    fn send_keys(&self, element: &ElementRef, text: &str) -> PepeniumResult<()>;

    /// Serialized UI tree (XML on devices, HTML in browsers)
    fn page_source(&self) -> PepeniumResult<String>;

    /// Current window size
    fn window_size(&self) -> PepeniumResult<Size>;

    /// Dispatch W3C input sequences and release them
    fn perform_actions(&self, actions: &[ActionSequence]) -> PepeniumResult<()>;

    /// PNG screenshot of the viewport
    fn screenshot_png(&self) -> PepeniumResult<Vec<u8>>;

    /// Run a synchronous script in the page
    fn execute_script(&self, script: &str, args: Vec<Value>) -> PepeniumResult<Value>;

    /// Navigate to `url`
    fn navigate(&self, url: &str) -> PepeniumResult<()>;

    /// Capabilities the session was created with
    fn capabilities(&self) -> &Capabilities;

    /// Current implicit wait
    fn implicit_wait(&self) -> PepeniumResult<Duration>;

    /// Change the implicit wait
    fn set_implicit_wait(&self, wait: Duration) -> PepeniumResult<()>;

    /// End the session
    fn quit(&self) -> PepeniumResult<()>;

    /// Platform from the `platformName` capability
    fn platform(&self) -> Platform {
        self.capabilities().platform()
    }
}

/// Shared handle to a driver
impl<D: AutomationDriver + ?Sized> AutomationDriver for Rc<D> {
    fn find_elements(&self, locator: &Locator) -> PepeniumResult<Vec<ElementRef>> {
        (**self).find_elements(locator)
    }
    fn find_element(&self, locator: &Locator) -> PepeniumResult<ElementRef> {
        (**self).find_element(locator)
    }
    fn is_displayed(&self, element: &ElementRef) -> PepeniumResult<bool> {
        (**self).is_displayed(element)
    }
    fn is_enabled(&self, element: &ElementRef) -> PepeniumResult<bool> {
        (**self).is_enabled(element)
    }
    fn element_rect(&self, element: &ElementRef) -> PepeniumResult<Rect> {
        (**self).element_rect(element)
    }
    fn element_text(&self, element: &ElementRef) -> PepeniumResult<String> {
        (**self).element_text(element)
    }
    fn click(&self, element: &ElementRef) -> PepeniumResult<()> {
        (**self).click(element)
    }
    fn clear(&self, element: &ElementRef) -> PepeniumResult<()> {
        (**self).clear(element)
    }
    fn send_keys(&self, element: &ElementRef, text: &str) -> PepeniumResult<()> {
        (**self).send_keys(element, text)
    }
    fn page_source(&self) -> PepeniumResult<String> {
        (**self).page_source()
    }
    fn window_size(&self) -> PepeniumResult<Size> {
        (**self).window_size()
    }
    fn perform_actions(&self, actions: &[ActionSequence]) -> PepeniumResult<()> {
        (**self).perform_actions(actions)
    }
    fn screenshot_png(&self) -> PepeniumResult<Vec<u8>> {
        (**self).screenshot_png()
    }
    fn execute_script(&self, script: &str, args: Vec<Value>) -> PepeniumResult<Value> {
        (**self).execute_script(script, args)
    }
    fn navigate(&self, url: &str) -> PepeniumResult<()> {
        (**self).navigate(url)
    }
    fn capabilities(&self) -> &Capabilities {
        (**self).capabilities()
    }
    fn implicit_wait(&self) -> PepeniumResult<Duration> {
        (**self).implicit_wait()
    }
    fn set_implicit_wait(&self, wait: Duration) -> PepeniumResult<()> {
        (**self).set_implicit_wait(wait)
    }
    fn quit(&self) -> PepeniumResult<()> {
        (**self).quit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ref_json() {
        let el = ElementRef::new("42");
        let value = el.to_json();
        assert_eq!(value[ELEMENT_KEY], "42");
        assert_eq!(ElementRef::from_json(&value), Some(el));
    }

    #[test]
    fn test_element_ref_from_json_missing_key() {
        assert_eq!(ElementRef::from_json(&json!({"ELEMENT": "1"})), None);
    }

    #[test]
    fn test_element_ref_display() {
        assert_eq!(ElementRef::new("abc").to_string(), "element(abc)");
    }
}
