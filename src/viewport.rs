use crate::geometry::{Point, Rect, Vec2};

// ============================================================================
// VIEWPORT — where the document sits on screen and how large its pixels are
// ============================================================================

/// Absolute repositioning requested during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewAnchor {
    /// Put the document's top-left corner at this screen position.
    At(Vec2),
    /// Centre the document inside this screen rectangle.
    Center(Rect),
}

/// Everything a single frame wants to do to the view, collected while the
/// input is processed and applied once at the end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewDelta {
    /// Screen-space offset added to `art_pos`.
    pub pan: Vec2,
    /// Multiplicative zoom factor for both axes (1.0 = unchanged).
    pub zoom: f32,
    pub anchor: Option<ViewAnchor>,
}

impl Default for ViewDelta {
    fn default() -> Self {
        Self { pan: Vec2::ZERO, zoom: 1.0, anchor: None }
    }
}

impl ViewDelta {
    pub fn is_identity(&self) -> bool {
        self.pan == Vec2::ZERO && self.zoom == 1.0 && self.anchor.is_none()
    }

    pub fn zoom_in(&mut self, step: f32) {
        self.zoom *= step;
    }

    pub fn zoom_out(&mut self, step: f32) {
        self.zoom /= step;
    }
}

/// `(art_pos, scale)` with the scale kept inside `[min_scale, max_scale]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub art_pos: Vec2,
    scale: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl Viewport {
    /// `min_scale` is raised to 1 so the integer pixel size is never zero.
    pub fn new(art_pos: Vec2, scale: f32, min_scale: f32, max_scale: f32) -> Self {
        let min_scale = min_scale.max(1.0);
        let max_scale = max_scale.max(min_scale);
        Self {
            art_pos,
            scale: Vec2::splat(scale.clamp(min_scale, max_scale)),
            min_scale,
            max_scale,
        }
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = Vec2::new(
            scale.x.clamp(self.min_scale, self.max_scale),
            scale.y.clamp(self.min_scale, self.max_scale),
        );
    }

    /// Integer on-screen size of one canvas pixel, at least 1 per axis.
    pub fn pixel_size(&self) -> Point {
        Point::new((self.scale.x as i32).max(1), (self.scale.y as i32).max(1))
    }

    /// Integer screen position of the document's top-left corner.
    pub fn origin(&self) -> Point {
        self.art_pos.to_point()
    }

    /// Canvas pixel under a screen position. Positions left of or above
    /// the document map to negative coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.origin()).div_floor(self.pixel_size())
    }

    /// Screen rectangle covered by a `canvas`-sized document.
    pub fn document_rect(&self, canvas: Point) -> Rect {
        let ps = self.pixel_size();
        Rect::from_pos_size(self.origin(), canvas.x * ps.x, canvas.y * ps.y)
    }

    /// `art_pos` that centres a `canvas`-sized document in `clip`.
    pub fn centered_in(&self, clip: &Rect, canvas: Point) -> Vec2 {
        let ps = self.pixel_size();
        let art_size = Vec2::new((canvas.x * ps.x) as f32, (canvas.y * ps.y) as f32);
        let clip_size = Vec2::new(clip.width() as f32, clip.height() as f32);
        clip_size / 2.0 - art_size / 2.0 + clip.top_left().to_vec2()
    }

    /// Apply a frame's accumulated changes: zoom, then the anchor (computed
    /// at the new zoom), then the pan offset.
    pub fn apply(&mut self, delta: &ViewDelta, canvas: Point) {
        if delta.is_identity() {
            return;
        }
        if delta.zoom != 1.0 {
            self.set_scale(self.scale * delta.zoom);
        }
        match delta.anchor {
            Some(ViewAnchor::At(pos)) => self.art_pos = pos,
            Some(ViewAnchor::Center(clip)) => self.art_pos = self.centered_in(&clip, canvas),
            None => {}
        }
        self.art_pos += delta.pan;
    }
}
