//! Gesture geometry.
//!
//! Pure functions from screen/element geometry to [`Swipe`]s and taps; the
//! result is turned into W3C touch actions with [`Swipe::to_actions`].

use std::fmt;
use std::time::Duration;

use crate::input::{ActionSequence, KEY_ESCAPE};
use crate::locator::{Point, Rect, Size};

/// Hold time of a synthesized tap
pub const TAP_HOLD: Duration = Duration::from_millis(80);

/// Duration of a safe-zone scroll swipe
pub const SAFE_SWIPE_DURATION: Duration = Duration::from_millis(350);

/// Direction the finger travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Finger moves towards the top (content scrolls down)
    Up,
    /// Finger moves towards the bottom
    Down,
    /// Finger moves towards the left
    Left,
    /// Finger moves towards the right
    Right,
}

impl Direction {
    /// Vertical swipe
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// A single-finger drag between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    /// Touch-down point
    pub from: Point,
    /// Lift-off point
    pub to: Point,
    /// Time spent moving
    pub duration: Duration,
}

impl Swipe {
    /// Touch actions for this swipe
    #[must_use]
    pub fn to_actions(&self) -> ActionSequence {
        ActionSequence::finger()
            .move_to(self.from, Duration::ZERO)
            .down()
            .move_to(self.to, self.duration)
            .up()
    }
}

/// Touch actions for a tap with a short hold
#[must_use]
pub fn tap(at: Point) -> ActionSequence {
    ActionSequence::finger()
        .move_to(at, Duration::ZERO)
        .down()
        .pause(TAP_HOLD)
        .up()
}

/// Key actions pressing Escape
#[must_use]
pub fn escape() -> ActionSequence {
    ActionSequence::keyboard().press_key(KEY_ESCAPE)
}

// =============================================================================
// FULL-SCREEN SWIPES
// =============================================================================

/// Start/end ratios for full-screen swipes per direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRatios {
    /// Vertical start/end for `Up`
    pub up: (f64, f64),
    /// Vertical start/end for `Down`
    pub down: (f64, f64),
    /// Horizontal start/end for `Left`
    pub left: (f64, f64),
    /// Horizontal start/end for `Right`
    pub right: (f64, f64),
    /// Gesture duration
    pub duration: Duration,
}

impl SwipeRatios {
    /// Android screens
    pub const ANDROID: Self = Self {
        up: (0.90, 0.50),
        down: (0.10, 0.90),
        left: (0.90, 0.10),
        right: (0.10, 0.90),
        duration: Duration::from_millis(500),
    };

    /// iOS screens
    pub const IOS: Self = Self {
        up: (0.85, 0.20),
        down: (0.20, 0.85),
        left: (0.85, 0.15),
        right: (0.15, 0.85),
        duration: Duration::from_millis(500),
    };

    /// Swipe across a window of `size`
    #[must_use]
    pub fn swipe(&self, size: Size, direction: Direction) -> Swipe {
        let (from, to) = match direction {
            Direction::Up => (size.at(0.5, self.up.0), size.at(0.5, self.up.1)),
            Direction::Down => (size.at(0.5, self.down.0), size.at(0.5, self.down.1)),
            Direction::Left => (size.at(self.left.0, 0.5), size.at(self.left.1, 0.5)),
            Direction::Right => (size.at(self.right.0, 0.5), size.at(self.right.1, 0.5)),
        };
        Swipe {
            from,
            to,
            duration: self.duration,
        }
    }
}

// =============================================================================
// ELEMENT SWIPES
// =============================================================================

/// Limits applied to swipes anchored on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSwipeLimits {
    /// Shortest travel in pixels
    pub min_distance: i64,
    /// Distance kept from the window edges
    pub margin: i64,
    /// Shortest gesture duration
    pub min_duration: Duration,
}

impl ElementSwipeLimits {
    /// Android screens
    pub const ANDROID: Self = Self {
        min_distance: 1,
        margin: 5,
        min_duration: Duration::ZERO,
    };

    /// iOS screens
    pub const IOS: Self = Self {
        min_distance: 10,
        margin: 20,
        min_duration: Duration::from_millis(400),
    };
}

/// Swipe from the centre of `element` by `percent` of its extent
///
/// Both ends are clamped into the window, `limits.margin` pixels from
/// the edges.
#[must_use]
pub fn swipe_at_element(
    element: Rect,
    window: Size,
    direction: Direction,
    percent: f64,
    duration: Duration,
    limits: ElementSwipeLimits,
) -> Swipe {
    let center = element.center();
    let extent = if direction.is_vertical() {
        element.height
    } else {
        element.width
    };
    let distance = ((extent as f64 * percent) as i64).max(limits.min_distance);
    let to = match direction {
        Direction::Up => Point::new(center.x, center.y - distance),
        Direction::Down => Point::new(center.x, center.y + distance),
        Direction::Left => Point::new(center.x - distance, center.y),
        Direction::Right => Point::new(center.x + distance, center.y),
    };
    Swipe {
        from: clamp(center, window, limits.margin),
        to: clamp(to, window, limits.margin),
        duration: duration.max(limits.min_duration),
    }
}

/// Clamp `point` into the window, `margin` pixels from each edge
#[must_use]
pub fn clamp(point: Point, window: Size, margin: i64) -> Point {
    let max_x = (window.width - margin).max(margin);
    let max_y = (window.height - margin).max(margin);
    Point::new(point.x.clamp(margin, max_x), point.y.clamp(margin, max_y))
}

// =============================================================================
// SAFE-ZONE SCROLL
// =============================================================================

/// Central band of the window free of bars and edge gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeZone {
    /// Left edge of the band
    pub left: i64,
    /// Right edge of the band
    pub right: i64,
    /// Top edge of the band
    pub top: i64,
    /// Bottom edge of the band
    pub bottom: i64,
}

impl SafeZone {
    /// 8 %–92 % horizontally, 18 %–82 % vertically
    #[must_use]
    pub fn of(window: Size) -> Self {
        let w = window.width as f64;
        let h = window.height as f64;
        Self {
            left: (w * 0.08) as i64,
            right: (w * 0.92) as i64,
            top: (h * 0.18) as i64,
            bottom: (h * 0.82) as i64,
        }
    }

    /// Upward swipe inside the band, 10 % in from its top and bottom
    #[must_use]
    pub fn scroll_swipe(&self) -> Swipe {
        let x = (self.left + self.right) / 2;
        let inset = (self.bottom - self.top) as f64 * 0.10;
        Swipe {
            from: Point::new(x, (self.bottom as f64 - inset) as i64),
            to: Point::new(x, (self.top as f64 + inset) as i64),
            duration: SAFE_SWIPE_DURATION,
        }
    }

    /// Whether `point` lies inside the band
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}
