//! Locators and screen geometry.
//!
//! A [`Locator`] names a UI element by one of the W3C / Appium selector
//! strategies. Its `Display` form (`By.xpath: //...`) is the one used in
//! log lines and not-found errors.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::PepeniumError;

/// A point on the screen, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a window or element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Point at the given fractions of width and height
    #[must_use]
    pub fn at(&self, fx: f64, fy: f64) -> Point {
        Point::new(
            (self.width as f64 * fx) as i64,
            (self.height as f64 * fy) as i64,
        )
    }

    /// Centre of the area
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

/// Element or window rectangle
///
/// Compared by value; an unchanged rectangle between two samples is what the
/// stability detector treats as a settled layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i64,
    /// Top edge
    pub y: i64,
    /// Width
    pub width: i64,
    /// Height
    pub height: i64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin covering `size`
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Centre point
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Size of the rectangle
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Selector for locating a UI element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// XPath expression
    XPath(String),
    /// CSS selector
    Css(String),
    /// Element id (Android resource id)
    Id(String),
    /// Name attribute
    Name(String),
    /// Class name
    ClassName(String),
    /// Tag name
    TagName(String),
    /// Full link text
    LinkText(String),
    /// Accessibility id (content-desc / accessibilityIdentifier)
    AccessibilityId(String),
    /// Raw UiAutomator expression
    AndroidUiAutomator(String),
    /// XCUITest class chain
    IosClassChain(String),
    /// XCUITest NSPredicate string
    IosPredicate(String),
}

impl Locator {
    /// XPath locator
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    /// CSS locator
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    /// Id locator
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// Accessibility id locator
    #[must_use]
    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::AccessibilityId(value.into())
    }

    /// UiAutomator locator
    #[must_use]
    pub fn ui_automator(value: impl Into<String>) -> Self {
        Self::AndroidUiAutomator(value.into())
    }

    /// iOS class chain locator
    #[must_use]
    pub fn class_chain(value: impl Into<String>) -> Self {
        Self::IosClassChain(value.into())
    }

    /// iOS predicate locator
    #[must_use]
    pub fn predicate(value: impl Into<String>) -> Self {
        Self::IosPredicate(value.into())
    }

    /// W3C `using` value sent in find-element requests
    #[must_use]
    pub const fn using(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::Css(_) => "css selector",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "class name",
            Self::TagName(_) => "tag name",
            Self::LinkText(_) => "link text",
            Self::AccessibilityId(_) => "accessibility id",
            Self::AndroidUiAutomator(_) => "-android uiautomator",
            Self::IosClassChain(_) => "-ios class chain",
            Self::IosPredicate(_) => "-ios predicate string",
        }
    }

    /// Selector expression
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::XPath(v)
            | Self::Css(v)
            | Self::Id(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::TagName(v)
            | Self::LinkText(v)
            | Self::AccessibilityId(v)
            | Self::AndroidUiAutomator(v)
            | Self::IosClassChain(v)
            | Self::IosPredicate(v) => v,
        }
    }

    const fn strategy_label(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::Css(_) => "cssSelector",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "className",
            Self::TagName(_) => "tagName",
            Self::LinkText(_) => "linkText",
            Self::AccessibilityId(_) => "accessibilityId",
            Self::AndroidUiAutomator(_) => "androidUIAutomator",
            Self::IosClassChain(_) => "iOSClassChain",
            Self::IosPredicate(_) => "iOSNsPredicateString",
        }
    }

    /// Android `UiSelector` expression for the native scroll primitive
    ///
    /// Only ids and XPath expressions that pin a resource id or text can be
    /// expressed; anything else returns `None`.
    #[must_use]
    pub fn to_ui_selector(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("new UiSelector().resourceId(\"{id}\")")),
            Self::XPath(xpath) => xpath_to_ui_selector(xpath),
            _ => None,
        }
    }
}

fn xpath_to_ui_selector(xpath: &str) -> Option<String> {
    let patterns = [
        (r"@resource-id\s*=\s*'([^']+)'", "resourceId"),
        (r"text\(\)\s*=\s*'([^']+)'", "text"),
        (r"contains\(text\(\),\s*'([^']+)'\)", "textContains"),
    ];
    for (pattern, method) in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(value) = re.captures(xpath).and_then(|c| c.get(1)) {
            return Some(format!("new UiSelector().{method}(\"{}\")", value.as_str()));
        }
    }
    None
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.strategy_label(), self.value())
    }
}

impl FromStr for Locator {
    type Err = PepeniumError;

    /// Parse `<strategy>=<value>`, e.g. `xpath=//button` or `id=com.app:id/ok`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || PepeniumError::InvalidLocator {
            input: input.to_string(),
        };
        let (strategy, value) = input.split_once('=').ok_or_else(invalid)?;
        let value = value.to_string();
        if value.is_empty() {
            return Err(invalid());
        }
        let locator = match strategy.trim().to_ascii_lowercase().as_str() {
            "xpath" => Self::XPath(value),
            "css" => Self::Css(value),
            "id" => Self::Id(value),
            "name" => Self::Name(value),
            "class" | "classname" => Self::ClassName(value),
            "tag" | "tagname" => Self::TagName(value),
            "link" | "linktext" => Self::LinkText(value),
            "accessibility" | "accessibilityid" | "aid" => Self::AccessibilityId(value),
            "uiautomator" => Self::AndroidUiAutomator(value),
            "classchain" => Self::IosClassChain(value),
            "predicate" => Self::IosPredicate(value),
            _ => return Err(invalid()),
        };
        Ok(locator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod geometry_tests {
        use super::*;

        #[test]
        fn test_rect_center() {
            let rect = Rect::new(10, 20, 100, 50);
            assert_eq!(rect.center(), Point::new(60, 45));
            assert_eq!(rect.size(), Size::new(100, 50));
        }

        #[test]
        fn test_rect_equality_by_value() {
            assert_eq!(Rect::new(0, 0, 1080, 2200), Rect::new(0, 0, 1080, 2200));
            assert_ne!(Rect::new(0, 0, 1080, 2200), Rect::new(0, 1, 1080, 2200));
        }

        #[test]
        fn test_size_fractions() {
            let size = Size::new(1000, 2000);
            assert_eq!(size.at(0.5, 0.9), Point::new(500, 1800));
            assert_eq!(size.center(), Point::new(500, 1000));
        }

        #[test]
        fn test_rect_from_size() {
            assert_eq!(
                Rect::from_size(Size::new(390, 844)),
                Rect::new(0, 0, 390, 844)
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_using_strings() {
            assert_eq!(Locator::xpath("//a").using(), "xpath");
            assert_eq!(Locator::css("a").using(), "css selector");
            assert_eq!(Locator::accessibility_id("ok").using(), "accessibility id");
            assert_eq!(Locator::ui_automator("x").using(), "-android uiautomator");
            assert_eq!(Locator::class_chain("x").using(), "-ios class chain");
            assert_eq!(Locator::predicate("x").using(), "-ios predicate string");
        }

        #[test]
        fn test_display() {
            let loc = Locator::xpath("//*[@resource-id='click-bottom-tab-1']");
            assert_eq!(
                loc.to_string(),
                "By.xpath: //*[@resource-id='click-bottom-tab-1']"
            );
            assert_eq!(
                Locator::accessibility_id("btn-search-close").to_string(),
                "By.accessibilityId: btn-search-close"
            );
        }

        #[test]
        fn test_parse() {
            let loc: Locator = "xpath=//a[@href='x=y']".parse().unwrap();
            assert_eq!(loc, Locator::xpath("//a[@href='x=y']"));
            let loc: Locator = "aid=btn-close".parse().unwrap();
            assert_eq!(loc, Locator::accessibility_id("btn-close"));
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!("//a".parse::<Locator>().is_err());
            assert!("bogus=x".parse::<Locator>().is_err());
            assert!("xpath=".parse::<Locator>().is_err());
        }
    }

    mod ui_selector_tests {
        use super::*;

        #[test]
        fn test_id() {
            assert_eq!(
                Locator::id("com.app:id/list").to_ui_selector().unwrap(),
                "new UiSelector().resourceId(\"com.app:id/list\")"
            );
        }

        #[test]
        fn test_xpath_resource_id() {
            let loc = Locator::xpath("//*[@resource-id = 'click-bottom-tab-2']");
            assert_eq!(
                loc.to_ui_selector().unwrap(),
                "new UiSelector().resourceId(\"click-bottom-tab-2\")"
            );
        }

        #[test]
        fn test_xpath_text() {
            let loc = Locator::xpath("//android.widget.TextView[text()='Ajustes']");
            assert_eq!(
                loc.to_ui_selector().unwrap(),
                "new UiSelector().text(\"Ajustes\")"
            );
        }

        #[test]
        fn test_xpath_contains_text() {
            let loc = Locator::xpath("//*[contains(text(), 'Sign')]");
            assert_eq!(
                loc.to_ui_selector().unwrap(),
                "new UiSelector().textContains(\"Sign\")"
            );
        }

        #[test]
        fn test_unconvertible() {
            assert!(Locator::xpath("//android.widget.Button[2]")
                .to_ui_selector()
                .is_none());
            assert!(Locator::css("button").to_ui_selector().is_none());
            assert!(Locator::accessibility_id("x").to_ui_selector().is_none());
        }
    }
}
