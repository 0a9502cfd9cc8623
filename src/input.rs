use std::collections::HashSet;

use crate::geometry::Point;

/// One wheel notch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelEvent {
    Up,
    Down,
}

/// Logical keys and modifiers the canvas controller reacts to. The host maps
/// physical keys onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Drag with the primary button pans the view.
    Pan,
    /// Wheel zooms instead of scrolling; enables the zoom/reset shortcuts.
    Precision,
    Fast,
    Slow,
    /// Resizer keeps the rectangle square.
    Square,
    /// Brush/eraser draws a straight segment from the previous stroke point.
    StraightLine,
    /// Primary click samples the colour under the cursor.
    Sample,
    HorizontalScroll,
    ZoomIn,
    ZoomOut,
    ResetView,
    Save,
    NewLayer,
    DuplicateLayer,
    DeleteLayer,
    Copy,
    Paste,
    Up,
    Down,
    Left,
    Right,
}

/// Input snapshot for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    /// Pointer position in screen space.
    pub pointer: Point,
    pub primary_down: bool,
    pub secondary_down: bool,
    /// Wheel notches received since the previous frame, oldest first.
    pub wheel: Vec<WheelEvent>,
    /// Keys currently held.
    pub keys: HashSet<Key>,
}

impl FrameInput {
    pub fn at(pointer: Point) -> Self {
        Self { pointer, ..Self::default() }
    }

    pub fn held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn with_primary(mut self) -> Self {
        self.primary_down = true;
        self
    }

    pub fn with_secondary(mut self) -> Self {
        self.secondary_down = true;
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.insert(key);
        self
    }

    pub fn with_wheel(mut self, event: WheelEvent) -> Self {
        self.wheel.push(event);
        self
    }
}
