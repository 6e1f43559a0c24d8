//! Pepenium: mobile and web UI test automation over Appium / WebDriver
//!
//! Page objects talk to an actions facade ([`AppActions`], [`IosActions`],
//! [`WebActions`]); the facades wait, gesture and settle through the
//! [`AutomationDriver`] seam; a [`DriverProfile`] decides where the session
//! runs and a [`SuiteSession`] owns it for the duration of a suite.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ Page objects │───►│   Actions    │───►│  AutomationDriver    │
//! │              │    │ waits/swipes │    │  (W3C WebDriver)     │
//! └──────────────┘    └──────┬───────┘    └──────────▲───────────┘
//!                            │                       │
//!                 ┌──────────▼──────────┐   ┌────────┴─────────┐
//!                 │ ScreenStability     │   │ DriverProfile    │
//!                 │ ScrollResolver      │   │ AWS / BS / local │
//!                 └─────────────────────┘   └──────────────────┘
//! ```
//!
//! The two heuristics at the core are [`ScreenStabilityDetector`], which
//! decides when the screen stopped changing, and [`ScrollResolver`], which
//! swipes until an element is visible or the list stops moving.

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod actions;
pub mod capabilities;
pub mod clock;
pub mod config;
pub mod driver;
pub mod gesture;
pub mod input;
pub mod locator;
pub mod mock;
pub mod page_object;
pub mod profiles;
mod result;
pub mod screenshot;
pub mod scroll;
pub mod service;
pub mod session;
pub mod settle;
pub mod wait;
pub mod webdriver;

pub use actions::{ActionTimeouts, AppActions, IosActions, WebActions};
pub use capabilities::{Capabilities, Platform};
pub use clock::{Clock, FakeClock, SharedClock, SystemClock};
pub use config::Environment;
pub use driver::{AutomationDriver, ElementRef};
pub use gesture::{Direction, Swipe};
pub use locator::{Locator, Point, Rect, Size};
pub use mock::ScriptedDriver;
pub use page_object::{PageObject, SimplePage};
pub use profiles::{profile_by_name, DriverProfile, PROFILE_NAMES};
pub use result::{PepeniumError, PepeniumResult};
pub use screenshot::ScreenshotSink;
pub use scroll::ScrollResolver;
pub use service::{AppiumService, ServiceOptions};
pub use session::{SessionState, SuiteSession};
pub use settle::{QuickSettle, ScreenStabilityDetector, StabilityPolicy, StabilityReport};
pub use wait::{Condition, WaitOptions, Waiter};
pub use webdriver::{SessionRequest, WebDriverSession};
