// ============================================================================
// CLIPBOARD OPERATIONS — copy a selection, paste it back with chroma keying
// ============================================================================

use crate::canvas::{CompositeMode, PixelBuffer};
use crate::geometry::{Point, Rect};

/// In-app clipboard owned by the canvas controller.
///
/// Holds a snapshot of the copied pixels plus the canvas position they were
/// copied from, which is also where a paste lands.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
    buffer: PixelBuffer,
    pos: Point,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Pixels currently held, empty before the first copy.
    pub fn contents(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    /// Snapshot `area` of `src`. The area is clipped to the buffer first;
    /// an area with nothing left leaves the clipboard unchanged.
    pub fn copy(&mut self, src: &PixelBuffer, area: &Rect) -> bool {
        let area = area.normalized().intersect(&src.rect());
        if area.is_empty() {
            return false;
        }
        self.buffer = src.clipped(&area);
        self.pos = area.top_left();
        log_info!(
            "Copied {}x{} at ({}, {})",
            area.width(),
            area.height(),
            self.pos.x,
            self.pos.y
        );
        true
    }

    /// Stamp the stored pixels onto `dst` at the stored position. Sentinel
    /// pixels in the clipboard are skipped, anything past the edge is clipped.
    pub fn paste(&self, dst: &mut PixelBuffer) -> bool {
        if self.is_empty() {
            return false;
        }
        dst.composite_at(&self.buffer, self.pos, CompositeMode::KeyedSource);
        true
    }
}
