// ============================================================================
// TOOLS — the active editing tool, chosen by the host UI
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolMode {
    #[default]
    Brush,
    Eraser,
    Bucket,
    Sampler,
    Hand,
    Zoomer,
    Resizer,
    Ruler,
    /// Moves the pixels inside the current selection.
    Pointer,
    /// Drags out a rectangular selection.
    Selector,
}

impl ToolMode {
    /// Tools that write or read single pixels under the cursor.
    pub fn is_pixel_tool(&self) -> bool {
        matches!(
            self,
            ToolMode::Brush | ToolMode::Eraser | ToolMode::Bucket | ToolMode::Sampler
        )
    }

    /// Tools that leave a freehand stroke (and honour the straight-line modifier).
    pub fn is_stroke_tool(&self) -> bool {
        matches!(self, ToolMode::Brush | ToolMode::Eraser)
    }
}
