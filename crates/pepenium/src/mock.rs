//! ScriptedDriver - in-memory [`AutomationDriver`] for tests.
//!
//! Every query can be scripted as a sequence of outcomes. Each call consumes
//! the front of its sequence; the last outcome repeats forever. Every call is
//! recorded so tests can assert on what the toolkit did, e.g.
//!
//! ```rust
//! use pepenium::{Locator, ScriptedDriver};
//! use pepenium::mock::Lookup;
//!
//! let driver = ScriptedDriver::android();
//! driver.script_lookup(&Locator::id("ok"), vec![Lookup::Missing, Lookup::found("el-1")]);
//! ```

use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::capabilities::Capabilities;
use crate::driver::{AutomationDriver, ElementRef};
use crate::input::ActionSequence;
use crate::locator::{Locator, Rect, Size};
use crate::result::{PepeniumError, PepeniumResult};

/// Minimal PNG signature returned by default screenshots
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Failure a scripted call can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// `stale element reference`
    Stale,
    /// `no such element`
    NoSuchElement,
    /// `element click intercepted`
    Intercepted,
    /// Any other remote error
    Other(String),
}

impl Failure {
    fn into_error(self) -> PepeniumError {
        match self {
            Self::Stale => PepeniumError::from_w3c("stale element reference", "scripted"),
            Self::NoSuchElement => PepeniumError::from_w3c("no such element", "scripted"),
            Self::Intercepted => PepeniumError::from_w3c("element click intercepted", "scripted"),
            Self::Other(message) => PepeniumError::from_w3c("unknown error", message),
        }
    }
}

/// Scripted outcome of a call
pub type Outcome<T> = Result<T, Failure>;

/// Scripted result of an element lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Matches these element ids
    Found(Vec<String>),
    /// No match
    Missing,
    /// Lookup itself fails
    Fail(Failure),
}

impl Lookup {
    /// Single match
    #[must_use]
    pub fn found(id: &str) -> Self {
        Self::Found(vec![id.to_string()])
    }

    /// Several matches
    #[must_use]
    pub fn many(ids: &[&str]) -> Self {
        Self::Found(ids.iter().map(ToString::to_string).collect())
    }
}

#[derive(Debug)]
struct Sequence<T> {
    items: VecDeque<T>,
}

impl<T: Clone> Sequence<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.items.len() > 1 {
            self.items.pop_front()
        } else {
            self.items.front().cloned()
        }
    }
}

#[derive(Debug)]
struct State {
    lookups: HashMap<Locator, Sequence<Lookup>>,
    displayed: HashMap<String, Sequence<Outcome<bool>>>,
    enabled: HashMap<String, bool>,
    rects: HashMap<String, Sequence<Outcome<Rect>>>,
    texts: HashMap<String, Sequence<String>>,
    clicks: HashMap<String, Sequence<Outcome<()>>>,
    page_sources: Sequence<Outcome<String>>,
    gestures: Sequence<Outcome<()>>,
    screenshots: Sequence<Outcome<Vec<u8>>>,
    script_results: Sequence<Value>,
    window: Size,
    implicit_wait: Duration,
    history: Vec<String>,
    performed: Vec<Vec<ActionSequence>>,
    typed: Vec<(String, String)>,
    current_url: Option<String>,
    quit: bool,
}

/// In-memory automation driver with scripted responses
#[derive(Debug)]
pub struct ScriptedDriver {
    capabilities: Capabilities,
    state: RefCell<State>,
}

impl ScriptedDriver {
    /// Driver reporting the given capabilities
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            state: RefCell::new(State {
                lookups: HashMap::new(),
                displayed: HashMap::new(),
                enabled: HashMap::new(),
                rects: HashMap::new(),
                texts: HashMap::new(),
                clicks: HashMap::new(),
                page_sources: Sequence::new(vec![Ok("<hierarchy/>".to_string())]),
                gestures: Sequence::new(vec![Ok(())]),
                screenshots: Sequence::new(vec![Ok(FAKE_PNG.to_vec())]),
                script_results: Sequence::new(vec![Value::Null]),
                window: Size::new(1080, 2400),
                implicit_wait: Duration::ZERO,
                history: Vec::new(),
                performed: Vec::new(),
                typed: Vec::new(),
                current_url: None,
                quit: false,
            }),
        }
    }

    /// Android UiAutomator2 session
    #[must_use]
    pub fn android() -> Self {
        Self::new(Capabilities::uiautomator2())
    }

    /// iOS XCUITest session
    #[must_use]
    pub fn ios() -> Self {
        Self::new(Capabilities::xcuitest())
    }

    /// Desktop Chrome session
    #[must_use]
    pub fn web() -> Self {
        Self::new(Capabilities::new().browser_name("Chrome"))
    }

    /// Set the window size
    pub fn set_window(&self, size: Size) -> &Self {
        self.state.borrow_mut().window = size;
        self
    }

    /// Script successive results of looking up `locator`
    pub fn script_lookup(&self, locator: &Locator, outcomes: Vec<Lookup>) -> &Self {
        self.state
            .borrow_mut()
            .lookups
            .insert(locator.clone(), Sequence::new(outcomes));
        self
    }

    /// `locator` always resolves to element `id`
    pub fn place(&self, locator: &Locator, id: &str) -> &Self {
        self.script_lookup(locator, vec![Lookup::found(id)])
    }

    /// Script successive visibility answers for element `id`
    pub fn script_displayed(&self, id: &str, outcomes: Vec<Outcome<bool>>) -> &Self {
        self.state
            .borrow_mut()
            .displayed
            .insert(id.to_string(), Sequence::new(outcomes));
        self
    }

    /// Set whether element `id` is enabled
    pub fn set_enabled(&self, id: &str, enabled: bool) -> &Self {
        self.state
            .borrow_mut()
            .enabled
            .insert(id.to_string(), enabled);
        self
    }

    /// Script successive rectangles for element `id`
    pub fn script_rects(&self, id: &str, outcomes: Vec<Outcome<Rect>>) -> &Self {
        self.state
            .borrow_mut()
            .rects
            .insert(id.to_string(), Sequence::new(outcomes));
        self
    }

    /// Script successive texts for element `id`
    pub fn script_text(&self, id: &str, texts: &[&str]) -> &Self {
        let texts = texts.iter().map(ToString::to_string).collect();
        self.state
            .borrow_mut()
            .texts
            .insert(id.to_string(), Sequence::new(texts));
        self
    }

    /// Script successive click results for element `id`
    pub fn script_clicks(&self, id: &str, outcomes: Vec<Outcome<()>>) -> &Self {
        self.state
            .borrow_mut()
            .clicks
            .insert(id.to_string(), Sequence::new(outcomes));
        self
    }

    /// Script successive page sources
    pub fn script_page_sources(&self, outcomes: Vec<Outcome<String>>) -> &Self {
        self.state.borrow_mut().page_sources = Sequence::new(outcomes);
        self
    }

    /// Script successive results of `perform_actions`
    pub fn script_gestures(&self, outcomes: Vec<Outcome<()>>) -> &Self {
        self.state.borrow_mut().gestures = Sequence::new(outcomes);
        self
    }

    /// Script successive screenshot results
    pub fn script_screenshots(&self, outcomes: Vec<Outcome<Vec<u8>>>) -> &Self {
        self.state.borrow_mut().screenshots = Sequence::new(outcomes);
        self
    }

    /// Script successive script results
    pub fn script_results(&self, values: Vec<Value>) -> &Self {
        self.state.borrow_mut().script_results = Sequence::new(values);
        self
    }

    /// Every call made so far, e.g. `click:el-1`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Check whether a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state
            .borrow()
            .history
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Number of calls with this prefix
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Action batches passed to `perform_actions`, including failed ones
    #[must_use]
    pub fn performed(&self) -> Vec<Vec<ActionSequence>> {
        self.state.borrow().performed.clone()
    }

    /// `(element id, text)` pairs typed so far
    #[must_use]
    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.borrow().typed.clone()
    }

    /// Last URL navigated to
    #[must_use]
    pub fn current_url(&self) -> Option<String> {
        self.state.borrow().current_url.clone()
    }

    /// Whether `quit` was called
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.state.borrow().quit
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().history.push(call);
    }
}

impl AutomationDriver for ScriptedDriver {
    fn find_elements(&self, locator: &Locator) -> PepeniumResult<Vec<ElementRef>> {
        self.record(format!("find_elements:{locator}"));
        let outcome = self
            .state
            .borrow_mut()
            .lookups
            .get_mut(locator)
            .and_then(Sequence::next)
            .unwrap_or(Lookup::Missing);
        match outcome {
            Lookup::Found(ids) => Ok(ids.into_iter().map(ElementRef::new).collect()),
            Lookup::Missing => Ok(Vec::new()),
            Lookup::Fail(failure) => Err(failure.into_error()),
        }
    }

    fn is_displayed(&self, element: &ElementRef) -> PepeniumResult<bool> {
        self.record(format!("is_displayed:{}", element.id));
        self.state
            .borrow_mut()
            .displayed
            .get_mut(&element.id)
            .and_then(Sequence::next)
            .unwrap_or(Ok(true))
            .map_err(Failure::into_error)
    }

    fn is_enabled(&self, element: &ElementRef) -> PepeniumResult<bool> {
        self.record(format!("is_enabled:{}", element.id));
        Ok(self
            .state
            .borrow()
            .enabled
            .get(&element.id)
            .copied()
            .unwrap_or(true))
    }

    fn element_rect(&self, element: &ElementRef) -> PepeniumResult<Rect> {
        self.record(format!("element_rect:{}", element.id));
        let mut state = self.state.borrow_mut();
        let default = Ok(Rect::new(0, 0, 100, 100));
        state
            .rects
            .get_mut(&element.id)
            .and_then(Sequence::next)
            .unwrap_or(default)
            .map_err(Failure::into_error)
    }

    fn element_text(&self, element: &ElementRef) -> PepeniumResult<String> {
        self.record(format!("element_text:{}", element.id));
        Ok(self
            .state
            .borrow_mut()
            .texts
            .get_mut(&element.id)
            .and_then(Sequence::next)
            .unwrap_or_default())
    }

    fn click(&self, element: &ElementRef) -> PepeniumResult<()> {
        self.record(format!("click:{}", element.id));
        self.state
            .borrow_mut()
            .clicks
            .get_mut(&element.id)
            .and_then(Sequence::next)
            .unwrap_or(Ok(()))
            .map_err(Failure::into_error)
    }

    fn clear(&self, element: &ElementRef) -> PepeniumResult<()> {
        self.record(format!("clear:{}", element.id));
        Ok(())
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> PepeniumResult<()> {
        self.record(format!("send_keys:{}", element.id));
        self.state
            .borrow_mut()
            .typed
            .push((element.id.clone(), text.to_string()));
        Ok(())
    }

    fn page_source(&self) -> PepeniumResult<String> {
        self.record("page_source".to_string());
        self.state
            .borrow_mut()
            .page_sources
            .next()
            .unwrap_or_else(|| Ok(String::new()))
            .map_err(Failure::into_error)
    }

    fn window_size(&self) -> PepeniumResult<Size> {
        self.record("window_size".to_string());
        Ok(self.state.borrow().window)
    }

    fn perform_actions(&self, actions: &[ActionSequence]) -> PepeniumResult<()> {
        let ids: Vec<&str> = actions.iter().map(|a| a.id.as_str()).collect();
        self.record(format!("perform_actions:{}", ids.join(",")));
        let mut state = self.state.borrow_mut();
        state.performed.push(actions.to_vec());
        state
            .gestures
            .next()
            .unwrap_or(Ok(()))
            .map_err(Failure::into_error)
    }

    fn screenshot_png(&self) -> PepeniumResult<Vec<u8>> {
        self.record("screenshot".to_string());
        self.state
            .borrow_mut()
            .screenshots
            .next()
            .unwrap_or_else(|| Ok(FAKE_PNG.to_vec()))
            .map_err(Failure::into_error)
    }

    fn execute_script(&self, script: &str, _args: Vec<Value>) -> PepeniumResult<Value> {
        self.record(format!("execute_script:{script}"));
        Ok(self
            .state
            .borrow_mut()
            .script_results
            .next()
            .unwrap_or(Value::Null))
    }

    fn navigate(&self, url: &str) -> PepeniumResult<()> {
        self.record(format!("navigate:{url}"));
        self.state.borrow_mut().current_url = Some(url.to_string());
        Ok(())
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn implicit_wait(&self) -> PepeniumResult<Duration> {
        self.record("implicit_wait".to_string());
        Ok(self.state.borrow().implicit_wait)
    }

    fn set_implicit_wait(&self, wait: Duration) -> PepeniumResult<()> {
        self.record(format!("set_implicit_wait:{}", wait.as_millis()));
        self.state.borrow_mut().implicit_wait = wait;
        Ok(())
    }

    fn quit(&self) -> PepeniumResult<()> {
        self.record("quit".to_string());
        self.state.borrow_mut().quit = true;
        Ok(())
    }
}
