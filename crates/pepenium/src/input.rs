//! W3C input action sequences.
//!
//! Gestures are expressed as [`ActionSequence`]s and sent through
//! [`AutomationDriver::perform_actions`](crate::driver::AutomationDriver::perform_actions).

use serde_json::{json, Value};
use std::time::Duration;

use crate::locator::Point;

/// WebDriver key code for Escape
pub const KEY_ESCAPE: &str = "\u{E00C}";

/// Kind of pointer device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Finger on a touch screen
    Touch,
    /// Mouse
    Mouse,
}

impl PointerKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Mouse => "mouse",
        }
    }
}

/// Input source of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Pointer device
    Pointer(PointerKind),
    /// Keyboard
    Key,
}

/// One tick of an input sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStep {
    /// Move the pointer to a viewport position
    PointerMove {
        /// Target
        to: Point,
        /// Duration of the move
        duration: Duration,
    },
    /// Press the primary button / touch down
    PointerDown,
    /// Release the primary button / lift the finger
    PointerUp,
    /// Press a key
    KeyDown(String),
    /// Release a key
    KeyUp(String),
    /// Idle tick
    Pause(Duration),
}

/// Ordered steps for one input source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSequence {
    /// Source id, e.g. `finger`
    pub id: String,
    /// Device type
    pub source: InputSource,
    /// Steps in order
    pub steps: Vec<InputStep>,
}

impl ActionSequence {
    /// Touch pointer sequence named `finger`
    #[must_use]
    pub fn finger() -> Self {
        Self::pointer("finger", PointerKind::Touch)
    }

    /// Pointer sequence
    #[must_use]
    pub fn pointer(id: impl Into<String>, kind: PointerKind) -> Self {
        Self {
            id: id.into(),
            source: InputSource::Pointer(kind),
            steps: Vec::new(),
        }
    }

    /// Keyboard sequence
    #[must_use]
    pub fn keyboard() -> Self {
        Self {
            id: "keyboard".to_string(),
            source: InputSource::Key,
            steps: Vec::new(),
        }
    }

    /// Move to `to` over `duration`
    #[must_use]
    pub fn move_to(mut self, to: Point, duration: Duration) -> Self {
        self.steps.push(InputStep::PointerMove { to, duration });
        self
    }

    /// Pointer down
    #[must_use]
    pub fn down(mut self) -> Self {
        self.steps.push(InputStep::PointerDown);
        self
    }

    /// Pointer up
    #[must_use]
    pub fn up(mut self) -> Self {
        self.steps.push(InputStep::PointerUp);
        self
    }

    /// Idle for `duration`
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(InputStep::Pause(duration));
        self
    }

    /// Press and release a key
    #[must_use]
    pub fn press_key(mut self, key: &str) -> Self {
        self.steps.push(InputStep::KeyDown(key.to_string()));
        self.steps.push(InputStep::KeyUp(key.to_string()));
        self
    }

    /// W3C JSON for the `actions` array entry
    #[must_use]
    pub fn to_json(&self) -> Value {
        let actions: Vec<Value> = self.steps.iter().map(step_json).collect();
        match self.source {
            InputSource::Pointer(kind) => json!({
                "type": "pointer",
                "id": self.id,
                "parameters": { "pointerType": kind.as_str() },
                "actions": actions,
            }),
            InputSource::Key => json!({
                "type": "key",
                "id": self.id,
                "actions": actions,
            }),
        }
    }
}

fn step_json(step: &InputStep) -> Value {
    match step {
        InputStep::PointerMove { to, duration } => json!({
            "type": "pointerMove",
            "duration": duration.as_millis() as u64,
            "origin": "viewport",
            "x": to.x,
            "y": to.y,
        }),
        InputStep::PointerDown => json!({ "type": "pointerDown", "button": 0 }),
        InputStep::PointerUp => json!({ "type": "pointerUp", "button": 0 }),
        InputStep::KeyDown(key) => json!({ "type": "keyDown", "value": key }),
        InputStep::KeyUp(key) => json!({ "type": "keyUp", "value": key }),
        InputStep::Pause(duration) => json!({
            "type": "pause",
            "duration": duration.as_millis() as u64,
        }),
    }
}
