use std::collections::HashSet;

use crate::canvas::{CompositeMode, LayerStack, PixelBuffer};
use crate::color::{Color, Palette, CHROMA};
use crate::components::guides::{Axis, Guidelines};
use crate::components::tools::ToolMode;
use crate::geometry::{Point, Rect};
use crate::input::{FrameInput, Key, WheelEvent};
use crate::ops::clipboard::Clipboard;
use crate::ops::fill::flood_fill;
use crate::settings::EditorSettings;
use crate::viewport::{ViewAnchor, ViewDelta, Viewport};

// ============================================================================
// GESTURES
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum RulerGesture {
    #[default]
    Idle,
    /// Guideline that will be committed on release.
    Dragging { axis: Axis, value: i32 },
}

/// Resizer drag in screen space; both corners snapped to the pixel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ResizeGesture {
    #[default]
    Idle,
    Dragging { start: Point, end: Point },
}

/// Selector drag between two canvas pixels (both inclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SelectGesture {
    #[default]
    Idle,
    Dragging { start: Point, end: Point },
}

/// Pixels lifted out of the selection by the pointer tool.
#[derive(Clone, Debug, Default)]
enum MoveGesture {
    #[default]
    Idle,
    Dragging {
        /// Canvas position where the drag started.
        grab: Point,
        /// Whole-pixel offset from `origin`.
        offset: Point,
        origin: Rect,
        lifted: PixelBuffer,
    },
}

// ============================================================================
// FRAME RESULTS
// ============================================================================

/// What happened during one [`CanvasController::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Document pixels or layer membership changed.
    pub canvas_changed: bool,
    /// The save shortcut was pressed this frame.
    pub save_requested: bool,
}

/// A guideline clipped to the clip area, in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuideSegment {
    pub axis: Axis,
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizePreview {
    /// Drag rectangle in screen space, edges in drag order.
    pub rect: Rect,
    /// Canvas size that releasing now would produce.
    pub canvas_size: Point,
}

/// Everything a renderer needs to draw the canvas for one frame.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    /// Flattened document, each canvas pixel expanded to the pixel size.
    pub art: PixelBuffer,
    /// Checkerboard backdrop, same size as `art`.
    pub background: PixelBuffer,
    /// Screen position of the top-left corner of `art` and `background`.
    pub origin: Point,
    pub clip_area: Rect,
    pub guides: Vec<GuideSegment>,
    pub resize_preview: Option<ResizePreview>,
    /// Current selection in screen space.
    pub selection: Option<Rect>,
}

/// Two-colour checkerboard, one cell per canvas pixel.
pub fn checkerboard(width: u32, height: u32, light: Color, dark: Color) -> PixelBuffer {
    let mut pattern = PixelBuffer::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            pattern.put_pixel(x, y, if (x + y) % 2 == 0 { light } else { dark });
        }
    }
    pattern
}

// ============================================================================
// CANVAS CONTROLLER
// ============================================================================

/// Interactive editing state for one document: turns per-frame pointer and
/// key state into layer edits and viewport changes.
#[derive(Clone, Debug)]
pub struct CanvasController {
    layers: LayerStack,
    clip_area: Rect,
    view: Viewport,
    settings: EditorSettings,

    old_pointer: Option<Point>,
    prev_keys: HashSet<Key>,
    /// Canvas position of the previous brush/eraser frame.
    last_stroke: Option<Point>,
    /// Screen position where the last ruler drag started.
    ruler_anchor: Point,

    guides: Guidelines,
    ruler: RulerGesture,
    resize: ResizeGesture,
    select: SelectGesture,
    moving: MoveGesture,
    selection: Option<Rect>,
    clipboard: Clipboard,
}

impl CanvasController {
    /// Blank document sized from `settings`, top-left corner at the clip origin.
    pub fn new(clip_area: Rect, settings: &EditorSettings) -> Self {
        let layers = LayerStack::new(settings.canvas_width, settings.canvas_height);
        Self::with_layers(clip_area, settings, layers)
    }

    pub fn with_layers(clip_area: Rect, settings: &EditorSettings, layers: LayerStack) -> Self {
        let view = Viewport::new(
            clip_area.top_left().to_vec2(),
            settings.initial_scale,
            settings.min_scale,
            settings.max_scale,
        );
        Self {
            layers,
            clip_area,
            view,
            settings: settings.clone(),
            old_pointer: None,
            prev_keys: HashSet::new(),
            last_stroke: None,
            ruler_anchor: Point::ZERO,
            guides: Guidelines::new(),
            ruler: RulerGesture::Idle,
            resize: ResizeGesture::Idle,
            select: SelectGesture::Idle,
            moving: MoveGesture::Idle,
            selection: None,
            clipboard: Clipboard::new(),
        }
    }

    // ---- accessors ----------------------------------------------------------

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    pub fn viewport(&self) -> &Viewport {
        &self.view
    }

    pub fn clip_area(&self) -> Rect {
        self.clip_area
    }

    pub fn canvas_size(&self) -> Point {
        Point::new(self.layers.width() as i32, self.layers.height() as i32)
    }

    pub fn guides(&self) -> &Guidelines {
        &self.guides
    }

    /// Selection in canvas space.
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Resize every layer, top-left anchored. Zero-sized requests are refused.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log_warn!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        self.layers.resize_all(width, height);
        self.selection = self.selection.and_then(|s| non_empty(s.intersect(&self.layers_rect())));
        true
    }

    fn layers_rect(&self) -> Rect {
        Rect::from_pos_size(Point::ZERO, self.layers.width() as i32, self.layers.height() as i32)
    }

    // ---- per-frame update ---------------------------------------------------

    /// Process one frame of input with `tool` active. The sampler writes
    /// into `palette.primary`; painting reads both palette colours.
    pub fn update(&mut self, input: &FrameInput, tool: ToolMode, palette: &mut Palette) -> FrameOutcome {
        let pressed: HashSet<Key> = input.keys.difference(&self.prev_keys).copied().collect();
        let mut outcome = FrameOutcome::default();

        self.handle_pointer(input, tool, palette, &pressed, &mut outcome);
        self.handle_shortcuts(&pressed, &mut outcome);

        self.old_pointer = Some(input.pointer);
        self.prev_keys = input.keys.clone();
        outcome
    }

    fn handle_pointer(
        &mut self,
        input: &FrameInput,
        tool: ToolMode,
        palette: &mut Palette,
        pressed: &HashSet<Key>,
        outcome: &mut FrameOutcome,
    ) {
        self.cancel_gestures_for(tool, outcome);

        let pointer = input.pointer;
        let pointer_delta = pointer - self.old_pointer.unwrap_or(pointer);
        let in_clip = self.clip_area.contains(pointer);
        let canvas_pt = self.view.screen_to_canvas(pointer);
        let mut delta = ViewDelta::default();

        // Pan drag takes over the whole frame.
        if (input.held(Key::Pan) || tool == ToolMode::Hand) && input.primary_down {
            delta.pan = pointer_delta.to_vec2();
            self.view.apply(&delta, self.canvas_size());
            return;
        }

        // ---- ruler ----
        if tool == ToolMode::Ruler && in_clip {
            self.ruler_frame(input, canvas_pt);
        } else {
            self.ruler = RulerGesture::Idle;
        }

        // ---- straight line ----
        if tool.is_stroke_tool() && input.primary_down {
            let active = self.layers.active();
            if input.held(Key::StraightLine)
                && let Some(last) = self.last_stroke
                && active.in_bounds(last.x, last.y)
                && active.in_bounds(canvas_pt.x, canvas_pt.y)
            {
                let color = if tool == ToolMode::Eraser { CHROMA } else { palette.primary };
                self.layers
                    .active_mut()
                    .draw_line(last.to_vec2(), canvas_pt.to_vec2(), color);
                outcome.canvas_changed = true;
            }
            self.last_stroke = Some(canvas_pt);
        }

        // ---- colour sample ----
        if (input.held(Key::Sample) || tool == ToolMode::Sampler) && input.primary_down {
            let active = self.layers.active();
            if active.in_bounds(canvas_pt.x, canvas_pt.y) {
                palette.primary = active.get_pixel(canvas_pt.x, canvas_pt.y);
            }
            return;
        }

        // ---- pixel paint ----
        let on_document = self.view.document_rect(self.canvas_size()).contains(pointer);
        if tool.is_pixel_tool() && in_clip && on_document {
            let color = if input.primary_down {
                match tool {
                    ToolMode::Eraser => Some(CHROMA),
                    ToolMode::Sampler => None,
                    _ => Some(palette.primary),
                }
            } else if input.secondary_down && tool != ToolMode::Eraser {
                Some(palette.secondary)
            } else {
                None
            };

            if let Some(color) = color
                && !input.held(Key::Pan)
            {
                let layer = self.layers.active_mut();
                if tool == ToolMode::Bucket {
                    flood_fill(layer, canvas_pt, color);
                }
                layer.put_pixel(canvas_pt.x, canvas_pt.y, color);
                outcome.canvas_changed = true;
            }
        }

        // ---- wheel / zoom keys ----
        let precision = input.held(Key::Precision);
        for event in &input.wheel {
            let sign = match event {
                WheelEvent::Up => 1.0,
                WheelEvent::Down => -1.0,
            };
            if precision {
                match event {
                    WheelEvent::Up => delta.zoom_in(self.settings.zoom_step),
                    WheelEvent::Down => delta.zoom_out(self.settings.zoom_step),
                }
            } else if input.held(Key::HorizontalScroll) {
                delta.pan.x += sign * self.settings.scroll_speed;
            } else {
                delta.pan.y += sign * self.settings.scroll_speed;
            }
        }
        if precision {
            if pressed.contains(&Key::ZoomIn) {
                delta.zoom_in(self.settings.zoom_step);
            }
            if pressed.contains(&Key::ZoomOut) {
                delta.zoom_out(self.settings.zoom_step);
            }
            if pressed.contains(&Key::ResetView) {
                delta.anchor = Some(ViewAnchor::Center(self.clip_area));
            }
        }

        // ---- keyboard pan ----
        let mut speed = self.settings.pan_speed;
        if input.held(Key::Fast) {
            speed *= self.settings.fast_multiplier;
        }
        if input.held(Key::Slow) {
            speed *= self.settings.slow_multiplier;
        }
        if input.held(Key::Up) {
            delta.pan.y -= speed;
        }
        if input.held(Key::Down) {
            delta.pan.y += speed;
        }
        if input.held(Key::Left) {
            delta.pan.x -= speed;
        }
        if input.held(Key::Right) {
            delta.pan.x += speed;
        }

        // ---- zoomer drag ----
        if tool == ToolMode::Zoomer && in_clip && input.primary_down {
            if pointer_delta.x > 1 {
                delta.zoom_in(self.settings.zoomer_step);
            } else if pointer_delta.x < -1 {
                delta.zoom_out(self.settings.zoomer_step);
            }
        }

        // ---- resizer ----
        if tool == ToolMode::Resizer && in_clip {
            self.resize_frame(input, pointer, &mut delta, outcome);
        }

        // ---- selector / pointer ----
        if tool == ToolMode::Selector {
            self.select_frame(input, in_clip, canvas_pt);
        }
        if tool == ToolMode::Pointer {
            self.move_frame(input, in_clip, canvas_pt, outcome);
        }

        self.view.apply(&delta, self.canvas_size());
    }

    /// Drop gesture state that belongs to a tool other than `tool`.
    fn cancel_gestures_for(&mut self, tool: ToolMode, outcome: &mut FrameOutcome) {
        if tool != ToolMode::Ruler {
            self.ruler = RulerGesture::Idle;
        }
        if tool != ToolMode::Resizer {
            self.resize = ResizeGesture::Idle;
        }
        if tool != ToolMode::Selector
            && let SelectGesture::Dragging { start, end } = std::mem::take(&mut self.select)
        {
            self.selection = Some(cell_rect(start, end));
        }
        if tool != ToolMode::Pointer {
            self.drop_lifted(outcome);
        }
    }

    fn ruler_frame(&mut self, input: &FrameInput, canvas_pt: Point) {
        let pick = |axis: Axis| match axis {
            Axis::X => canvas_pt.x,
            Axis::Y => canvas_pt.y,
        };

        if input.secondary_down {
            let axis = Axis::dominant(input.pointer - self.ruler_anchor);
            let value = pick(axis);
            if self.guides.remove(axis, value) > 0 {
                log_info!("Removed {:?} guideline at {}", axis, value);
            }
        }

        if input.primary_down {
            if self.ruler == RulerGesture::Idle {
                self.ruler_anchor = input.pointer;
            }
            let axis = Axis::dominant(input.pointer - self.ruler_anchor);
            self.ruler = RulerGesture::Dragging { axis, value: pick(axis) };
        } else if let RulerGesture::Dragging { axis, value } = std::mem::take(&mut self.ruler) {
            self.guides.add(axis, value);
            log_info!("Added {:?} guideline at {}", axis, value);
        }
    }

    fn resize_frame(
        &mut self,
        input: &FrameInput,
        pointer: Point,
        delta: &mut ViewDelta,
        outcome: &mut FrameOutcome,
    ) {
        let ps = self.view.pixel_size();

        if input.primary_down {
            let start = match self.resize {
                ResizeGesture::Dragging { start, .. } => start,
                ResizeGesture::Idle => pointer.snapped_down(ps),
            };
            let mut end = pointer.snapped_down(ps);
            if input.held(Key::Square) {
                let area = Rect::from_edges(start.x, end.x, start.y, end.y);
                if area.width() != area.height() {
                    let square = area.squareized();
                    end = Point::new(square.right, square.bottom).snapped_down(ps);
                }
            }
            self.resize = ResizeGesture::Dragging { start, end };
            return;
        }

        // Release: taking the state makes the commit happen exactly once.
        if let ResizeGesture::Dragging { start, end } = std::mem::take(&mut self.resize) {
            let area = Rect::from_edges(start.x, end.x, start.y, end.y).divided_by(ps);
            let (w, h) = (area.width().unsigned_abs(), area.height().unsigned_abs());
            if self.resize_canvas(w, h) {
                delta.anchor = Some(ViewAnchor::At(start.to_vec2()));
                outcome.canvas_changed = true;
            }
        }
    }

    fn select_frame(&mut self, input: &FrameInput, in_clip: bool, canvas_pt: Point) {
        if input.secondary_down && in_clip {
            self.select = SelectGesture::Idle;
            self.selection = None;
            return;
        }

        if input.primary_down {
            // A drag starts inside the clip area but follows the pointer
            // outside it; the end stays clamped to the document.
            let size = self.canvas_size();
            let p = Point::new(canvas_pt.x.clamp(0, size.x - 1), canvas_pt.y.clamp(0, size.y - 1));
            let start = match self.select {
                SelectGesture::Dragging { start, .. } => start,
                SelectGesture::Idle if in_clip => p,
                SelectGesture::Idle => return,
            };
            self.select = SelectGesture::Dragging { start, end: p };
            self.selection = Some(cell_rect(start, p));
        } else if let SelectGesture::Dragging { start, end } = std::mem::take(&mut self.select) {
            let sel = cell_rect(start, end);
            self.selection = Some(sel);
            log_info!("Selected {}x{} at ({}, {})", sel.width(), sel.height(), sel.left, sel.top);
        }
    }

    fn move_frame(&mut self, input: &FrameInput, in_clip: bool, canvas_pt: Point, outcome: &mut FrameOutcome) {
        if !input.primary_down {
            self.drop_lifted(outcome);
            return;
        }

        if let MoveGesture::Dragging { grab, offset, .. } = &mut self.moving {
            *offset = canvas_pt - *grab;
            return;
        }

        // Press inside the selection lifts its pixels off the active layer.
        if let Some(sel) = self.selection
            && in_clip
            && sel.contains(canvas_pt)
        {
            let layer = self.layers.active_mut();
            let lifted = layer.clipped(&sel);
            layer.draw_rect(sel.left, sel.top, sel.width(), sel.height(), CHROMA);
            self.moving = MoveGesture::Dragging {
                grab: canvas_pt,
                offset: Point::ZERO,
                origin: sel,
                lifted,
            };
            outcome.canvas_changed = true;
        }
    }

    /// Stamp lifted pixels back down at their current offset.
    fn drop_lifted(&mut self, outcome: &mut FrameOutcome) {
        if let MoveGesture::Dragging { offset, origin, lifted, .. } = std::mem::take(&mut self.moving) {
            let dest = origin.moved_by(offset);
            self.layers
                .active_mut()
                .composite_at(&lifted, dest.top_left(), CompositeMode::KeyedSource);
            self.selection = non_empty(dest.intersect(&self.layers_rect()));
            outcome.canvas_changed = true;
        }
    }

    fn handle_shortcuts(&mut self, pressed: &HashSet<Key>, outcome: &mut FrameOutcome) {
        let touches_layers = [Key::NewLayer, Key::DuplicateLayer, Key::DeleteLayer, Key::Paste]
            .iter()
            .any(|k| pressed.contains(k));
        if touches_layers {
            self.drop_lifted(outcome);
        }

        if pressed.contains(&Key::NewLayer) && self.layers.add_layer() {
            outcome.canvas_changed = true;
        }
        if pressed.contains(&Key::DuplicateLayer) && self.layers.duplicate_layer() {
            outcome.canvas_changed = true;
        }
        if pressed.contains(&Key::DeleteLayer) && self.layers.remove_layer() {
            outcome.canvas_changed = true;
        }
        if pressed.contains(&Key::Copy)
            && let Some(sel) = self.selection
        {
            self.clipboard.copy(self.layers.active(), &sel);
        }
        if pressed.contains(&Key::Paste) && self.clipboard.paste(self.layers.active_mut()) {
            outcome.canvas_changed = true;
        }
        if pressed.contains(&Key::Save) {
            outcome.save_requested = true;
        }
    }

    // ---- render -------------------------------------------------------------

    pub fn render(&self) -> RenderFrame {
        let ps = self.view.pixel_size();
        let origin = self.view.origin();

        let mut flat = self.layers.composite();
        let mut selection = self.selection;
        if let MoveGesture::Dragging { offset, origin: from, lifted, .. } = &self.moving {
            let dest = from.moved_by(*offset);
            flat.composite_at(lifted, dest.top_left(), CompositeMode::KeyedSource);
            selection = Some(dest);
        }

        let background = checkerboard(
            self.layers.width(),
            self.layers.height(),
            self.settings.checker_light,
            self.settings.checker_dark,
        );

        let mut guides = Vec::new();
        for axis in [Axis::X, Axis::Y] {
            for &value in self.guides.list(axis) {
                guides.extend(self.guide_segment(axis, value));
            }
        }
        if let RulerGesture::Dragging { axis, value } = self.ruler {
            guides.extend(self.guide_segment(axis, value));
        }

        let resize_preview = match self.resize {
            ResizeGesture::Dragging { start, end } => {
                let rect = Rect::from_edges(start.x, end.x, start.y, end.y);
                let canvas = rect.divided_by(ps);
                Some(ResizePreview {
                    rect,
                    canvas_size: Point::new(canvas.width().abs(), canvas.height().abs()),
                })
            }
            ResizeGesture::Idle => None,
        };

        RenderFrame {
            art: flat.expanded_by(ps),
            background: background.expanded_by(ps),
            origin,
            clip_area: self.clip_area,
            guides,
            resize_preview,
            selection: selection.map(|s| s.scaled_by(ps).moved_by(origin)),
        }
    }

    /// Screen-space line for a guideline, or `None` when it falls on or
    /// outside the clip edges.
    fn guide_segment(&self, axis: Axis, value: i32) -> Option<GuideSegment> {
        let ps = self.view.pixel_size();
        let origin = self.view.origin();
        let clip = self.clip_area;
        match axis {
            Axis::X => {
                let pos = value * ps.x + origin.x;
                (pos > clip.left && pos < clip.right).then(|| GuideSegment {
                    axis,
                    from: Point::new(pos, clip.top),
                    to: Point::new(pos, clip.bottom),
                })
            }
            Axis::Y => {
                let pos = value * ps.y + origin.y;
                (pos > clip.top && pos < clip.bottom).then(|| GuideSegment {
                    axis,
                    from: Point::new(clip.left, pos),
                    to: Point::new(clip.right, pos),
                })
            }
        }
    }
}

/// Rectangle covering the pixels `a` and `b` and everything between them.
fn cell_rect(a: Point, b: Point) -> Rect {
    Rect::from_edges(a.x.min(b.x), a.x.max(b.x) + 1, a.y.min(b.y), a.y.max(b.y) + 1)
}

fn non_empty(r: Rect) -> Option<Rect> {
    (!r.is_empty()).then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    const C: Color = Color::rgb(12, 34, 56);

    /// 8x8 document at scale 10 in a 400x300 clip starting at the screen origin.
    fn controller() -> CanvasController {
        CanvasController::new(Rect::from_edges(0, 400, 0, 300), &EditorSettings::default())
    }

    fn palette() -> Palette {
        Palette { primary: C, secondary: Color::BLUE }
    }

    fn at(x: i32, y: i32) -> FrameInput {
        FrameInput::at(Point::new(x, y))
    }

    fn run(ctl: &mut CanvasController, tool: ToolMode, input: FrameInput) -> FrameOutcome {
        let mut pal = palette();
        ctl.update(&input, tool, &mut pal)
    }

    fn painted(ctl: &CanvasController, color: Color) -> usize {
        ctl.layers().active().pixels().iter().filter(|&&p| p == color).count()
    }

    // ---- painting -----------------------------------------------------------

    #[test]
    fn bucket_fills_blank_canvas() {
        let mut ctl = controller();
        let out = run(&mut ctl, ToolMode::Bucket, at(5, 5).with_primary());
        assert!(out.canvas_changed);
        assert_eq!(painted(&ctl, C), 64);
    }

    #[test]
    fn brush_eraser_and_secondary_colour() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(25, 35).with_primary());
        assert_eq!(ctl.layers().active().get_pixel(2, 3), C);

        run(&mut ctl, ToolMode::Brush, at(45, 5).with_secondary());
        assert_eq!(ctl.layers().active().get_pixel(4, 0), Color::BLUE);

        run(&mut ctl, ToolMode::Eraser, at(25, 35).with_primary());
        assert_eq!(ctl.layers().active().get_pixel(2, 3), CHROMA);

        // Eraser ignores the secondary button.
        run(&mut ctl, ToolMode::Eraser, at(45, 5).with_secondary());
        assert_eq!(ctl.layers().active().get_pixel(4, 0), Color::BLUE);
    }

    #[test]
    fn painting_outside_document_does_nothing() {
        let mut ctl = controller();
        let out = run(&mut ctl, ToolMode::Brush, at(200, 200).with_primary());
        assert!(!out.canvas_changed);
        assert_eq!(painted(&ctl, C), 0);
    }

    #[test]
    fn straight_line_joins_last_stroke_point() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(5, 5).with_primary());
        run(&mut ctl, ToolMode::Brush, at(5, 5));
        run(&mut ctl, ToolMode::Brush, at(45, 5).with_primary().with_key(Key::StraightLine));
        for x in 0..=4 {
            assert_eq!(ctl.layers().active().get_pixel(x, 0), C, "x = {x}");
        }
        assert_eq!(painted(&ctl, C), 5);
    }

    #[test]
    fn sampler_picks_colour_without_painting() {
        let mut ctl = controller();
        ctl.layers_mut().active_mut().put_pixel(2, 3, Color::RED);
        let mut pal = palette();
        ctl.update(&at(25, 35).with_primary(), ToolMode::Sampler, &mut pal);
        assert_eq!(pal.primary, Color::RED);

        let mut pal = palette();
        ctl.update(&at(5, 5).with_primary().with_key(Key::Sample), ToolMode::Brush, &mut pal);
        assert_eq!(pal.primary, CHROMA);
        assert_eq!(ctl.layers().active().get_pixel(0, 0), CHROMA);
    }

    #[test]
    fn pan_modifier_blocks_painting() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(5, 5));
        run(&mut ctl, ToolMode::Brush, at(5, 5).with_primary().with_key(Key::Pan));
        assert_eq!(painted(&ctl, C), 0);
    }

    // ---- viewport -----------------------------------------------------------

    #[test]
    fn hand_drag_pans_by_pointer_delta() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Hand, at(10, 10));
        run(&mut ctl, ToolMode::Hand, at(30, 15).with_primary());
        assert_eq!(ctl.viewport().art_pos, Vec2::new(20.0, 5.0));
    }

    #[test]
    fn first_frame_pan_does_not_jump() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Hand, at(120, 80).with_primary());
        assert_eq!(ctl.viewport().art_pos, Vec2::ZERO);
    }

    #[test]
    fn precision_wheel_zoom_is_clamped() {
        let mut ctl = controller();
        for _ in 0..50 {
            let input = at(500, 500).with_key(Key::Precision).with_wheel(WheelEvent::Up);
            run(&mut ctl, ToolMode::Brush, input);
        }
        assert_eq!(ctl.viewport().scale(), Vec2::splat(128.0));
        for _ in 0..50 {
            let input = at(500, 500).with_key(Key::Precision).with_wheel(WheelEvent::Down);
            run(&mut ctl, ToolMode::Brush, input);
        }
        assert_eq!(ctl.viewport().scale(), Vec2::splat(1.0));
        assert_eq!(ctl.viewport().pixel_size(), Point::new(1, 1));
    }

    #[test]
    fn plain_wheel_scrolls() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_wheel(WheelEvent::Up));
        assert_eq!(ctl.viewport().art_pos, Vec2::new(0.0, 5.5));
        let input = at(500, 500).with_key(Key::HorizontalScroll).with_wheel(WheelEvent::Down);
        run(&mut ctl, ToolMode::Brush, input);
        assert_eq!(ctl.viewport().art_pos, Vec2::new(-5.5, 5.5));
    }

    #[test]
    fn arrow_keys_pan_with_speed_modifiers() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Right));
        assert_eq!(ctl.viewport().art_pos.x, 2.0);
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Right).with_key(Key::Fast));
        assert_eq!(ctl.viewport().art_pos.x, 13.0);
        let both = at(500, 500)
            .with_key(Key::Up)
            .with_key(Key::Fast)
            .with_key(Key::Slow);
        run(&mut ctl, ToolMode::Brush, both);
        assert!((ctl.viewport().art_pos.y + 2.2).abs() < 1e-4);
    }

    #[test]
    fn zoom_keys_fire_once_per_press() {
        let mut ctl = controller();
        for _ in 0..3 {
            run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Precision).with_key(Key::ZoomIn));
        }
        assert!((ctl.viewport().scale().x - 12.0).abs() < 1e-4);
    }

    #[test]
    fn reset_view_centres_document() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Precision).with_key(Key::ResetView));
        // 80x80 document in a 400x300 clip.
        assert_eq!(ctl.viewport().art_pos, Vec2::new(160.0, 110.0));
    }

    #[test]
    fn zoomer_drag_right_zooms_in() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Zoomer, at(100, 100));
        run(&mut ctl, ToolMode::Zoomer, at(110, 100).with_primary());
        assert!((ctl.viewport().scale().x - 10.25).abs() < 1e-4);
        run(&mut ctl, ToolMode::Zoomer, at(111, 100).with_primary());
        assert!((ctl.viewport().scale().x - 10.25).abs() < 1e-4);
    }

    // ---- ruler --------------------------------------------------------------

    #[test]
    fn ruler_drag_commits_guideline_on_release() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Ruler, at(35, 20).with_primary());
        run(&mut ctl, ToolMode::Ruler, at(75, 22).with_primary());
        // In-progress guideline is visible before release.
        assert_eq!(ctl.render().guides.len(), 1);
        assert!(ctl.guides().is_empty());

        run(&mut ctl, ToolMode::Ruler, at(75, 22));
        assert_eq!(ctl.guides().list(Axis::X), &[7]);
        let frame = ctl.render();
        assert_eq!(
            frame.guides,
            vec![GuideSegment { axis: Axis::X, from: Point::new(70, 0), to: Point::new(70, 300) }]
        );

        // Secondary click on the same column removes it.
        run(&mut ctl, ToolMode::Ruler, at(75, 22).with_secondary());
        assert!(ctl.guides().is_empty());
    }

    #[test]
    fn leaving_ruler_tool_cancels_drag() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Ruler, at(35, 20).with_primary());
        run(&mut ctl, ToolMode::Hand, at(35, 20));
        run(&mut ctl, ToolMode::Ruler, at(35, 20));
        assert!(ctl.guides().is_empty());
    }

    // ---- resizer ------------------------------------------------------------

    #[test]
    fn resizer_commits_snapped_rectangle_once() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Resizer, at(13, 7).with_primary());
        run(&mut ctl, ToolMode::Resizer, at(47, 38).with_primary());
        let preview = ctl.render().resize_preview.unwrap();
        assert_eq!(preview.rect, Rect::from_edges(10, 40, 0, 30));
        assert_eq!(preview.canvas_size, Point::new(3, 3));

        let out = run(&mut ctl, ToolMode::Resizer, at(47, 38));
        assert!(out.canvas_changed);
        assert_eq!(ctl.canvas_size(), Point::new(3, 3));
        assert_eq!(ctl.viewport().art_pos, Vec2::new(10.0, 0.0));

        let out = run(&mut ctl, ToolMode::Resizer, at(47, 38));
        assert!(!out.canvas_changed);
        assert!(ctl.render().resize_preview.is_none());
    }

    #[test]
    fn resizer_square_modifier_uses_larger_side() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Resizer, at(10, 0).with_primary().with_key(Key::Square));
        run(&mut ctl, ToolMode::Resizer, at(50, 20).with_primary().with_key(Key::Square));
        run(&mut ctl, ToolMode::Resizer, at(50, 20));
        assert_eq!(ctl.canvas_size(), Point::new(4, 4));
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Resizer, at(33, 33).with_primary());
        let out = run(&mut ctl, ToolMode::Resizer, at(33, 33));
        assert!(!out.canvas_changed);
        assert_eq!(ctl.canvas_size(), Point::new(8, 8));
    }

    // ---- layers / selection -------------------------------------------------

    #[test]
    fn layer_shortcuts_are_edge_triggered() {
        let mut ctl = controller();
        for _ in 0..3 {
            run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::NewLayer));
        }
        assert_eq!(ctl.layers().len(), 2);
        run(&mut ctl, ToolMode::Brush, at(500, 500));
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::DuplicateLayer));
        assert_eq!(ctl.layers().len(), 3);
        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::DeleteLayer));
        assert_eq!(ctl.layers().len(), 2);
        assert_eq!(ctl.layers().selected(), 1);
    }

    #[test]
    fn save_shortcut_is_reported() {
        let mut ctl = controller();
        assert!(run(&mut ctl, ToolMode::Brush, at(0, 0).with_key(Key::Save)).save_requested);
        assert!(!run(&mut ctl, ToolMode::Brush, at(0, 0).with_key(Key::Save)).save_requested);
    }

    fn select_1_1_to_2_2(ctl: &mut CanvasController) {
        run(ctl, ToolMode::Selector, at(15, 15).with_primary());
        run(ctl, ToolMode::Selector, at(25, 25).with_primary());
        run(ctl, ToolMode::Selector, at(25, 25));
    }

    #[test]
    fn selector_drag_sets_canvas_selection() {
        let mut ctl = controller();
        select_1_1_to_2_2(&mut ctl);
        assert_eq!(ctl.selection(), Some(Rect::from_edges(1, 3, 1, 3)));
        assert_eq!(ctl.render().selection, Some(Rect::from_edges(10, 30, 10, 30)));

        run(&mut ctl, ToolMode::Selector, at(25, 25).with_secondary());
        assert_eq!(ctl.selection(), None);
    }

    #[test]
    fn selector_drag_keeps_its_anchor_outside_the_clip_area() {
        let mut ctl = controller();
        run(&mut ctl, ToolMode::Selector, at(15, 15).with_primary());
        run(&mut ctl, ToolMode::Selector, at(25, 25).with_primary());
        run(&mut ctl, ToolMode::Selector, at(500, 25).with_primary());
        assert_eq!(ctl.selection(), Some(Rect::from_edges(1, 8, 1, 3)));

        run(&mut ctl, ToolMode::Selector, at(45, 45).with_primary());
        run(&mut ctl, ToolMode::Selector, at(45, 45));
        assert_eq!(ctl.selection(), Some(Rect::from_edges(1, 5, 1, 5)));

        // A press that starts outside the clip area selects nothing.
        run(&mut ctl, ToolMode::Selector, at(500, 25).with_primary());
        run(&mut ctl, ToolMode::Selector, at(500, 25));
        assert_eq!(ctl.selection(), Some(Rect::from_edges(1, 5, 1, 5)));
    }

    #[test]
    fn copy_then_paste_onto_new_layer() {
        let mut ctl = controller();
        ctl.layers_mut().active_mut().put_pixel(1, 1, Color::RED);
        select_1_1_to_2_2(&mut ctl);

        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Copy));
        assert_eq!(ctl.clipboard().position(), Point::new(1, 1));
        assert_eq!(ctl.clipboard().contents().size(), Point::new(2, 2));

        run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::NewLayer));
        assert_eq!(ctl.layers().selected(), 1);
        let out = run(&mut ctl, ToolMode::Brush, at(500, 500).with_key(Key::Paste));
        assert!(out.canvas_changed);
        assert_eq!(ctl.layers().active().get_pixel(1, 1), Color::RED);
        assert_eq!(ctl.layers().active().get_pixel(2, 2), CHROMA);
    }

    #[test]
    fn pointer_tool_moves_selected_pixels() {
        let mut ctl = controller();
        ctl.layers_mut().active_mut().put_pixel(1, 1, Color::RED);
        select_1_1_to_2_2(&mut ctl);

        run(&mut ctl, ToolMode::Pointer, at(15, 15).with_primary());
        assert_eq!(ctl.layers().active().get_pixel(1, 1), CHROMA);
        // Lifted pixels still show up in the rendered frame.
        assert_eq!(ctl.render().art.get_pixel(15, 15), Color::RED);

        run(&mut ctl, ToolMode::Pointer, at(45, 35).with_primary());
        run(&mut ctl, ToolMode::Pointer, at(45, 35));
        assert_eq!(ctl.layers().active().get_pixel(4, 3), Color::RED);
        assert_eq!(ctl.layers().active().get_pixel(1, 1), CHROMA);
        assert_eq!(ctl.selection(), Some(Rect::from_edges(4, 6, 3, 5)));
    }

    // ---- render -------------------------------------------------------------

    #[test]
    fn render_expands_art_and_checkerboard() {
        let mut ctl = controller();
        ctl.layers_mut().active_mut().put_pixel(0, 0, C);
        let frame = ctl.render();
        assert_eq!(frame.art.size(), Point::new(80, 80));
        assert_eq!(frame.background.size(), Point::new(80, 80));
        assert_eq!(frame.art.get_pixel(9, 9), C);
        assert!(frame.art.get_pixel(10, 0).is_chroma());
        assert_eq!(frame.background.get_pixel(0, 0), Color::rgb(255, 255, 255));
        assert_eq!(frame.background.get_pixel(10, 0), Color::rgb(204, 204, 204));
        assert_eq!(frame.origin, Point::ZERO);
    }

    #[test]
    fn guides_on_clip_edge_are_hidden() {
        let mut ctl = controller();
        ctl.guides.add(Axis::X, 0);
        ctl.guides.add(Axis::Y, 3);
        let frame = ctl.render();
        assert_eq!(frame.guides.len(), 1);
        assert_eq!(frame.guides[0].axis, Axis::Y);
    }
}
