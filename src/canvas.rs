use std::fmt;

use crate::color::{Color, CHROMA};
use crate::geometry::{Point, Rect, Vec2};

// ============================================================================
// PIXEL BUFFER – flat row-major storage of packed colours
// ============================================================================

/// How `PixelBuffer::composite_at` decides which source pixels to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeMode {
    /// Overwrite every overlapping destination pixel.
    Opaque,
    /// Skip source pixels equal to the chroma sentinel (layer flattening, paste).
    KeyedSource,
    /// Only write into destination pixels that are still the chroma sentinel.
    KeyedDest,
}

/// Owned `width × height` grid of [`Color`]s.
///
/// Every pixel access is bounds-checked and panics on violation: an
/// out-of-range coordinate is a caller bug, never clamped.
///
/// `Default` is the empty 0×0 buffer, which is also what [`PixelBuffer::take`]
/// leaves behind in the donor.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    // ---- construction -------------------------------------------------------

    /// Allocate a `width × height` buffer. Contents are `Color::default()`;
    /// use [`PixelBuffer::blank`] for a document-style chroma fill.
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, Color::default())
    }

    pub fn new_filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Buffer filled entirely with the chroma sentinel.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, CHROMA)
    }

    /// Wrap a row-major pixel vector. `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel vector does not match {}x{}",
            width,
            height
        );
        Self { width, height, pixels }
    }

    /// Move the pixels out, leaving `self` as a valid empty 0×0 buffer.
    pub fn take(&mut self) -> PixelBuffer {
        std::mem::take(self)
    }

    // ---- accessors ----------------------------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width as i32, self.height as i32)
    }

    /// `{ 0, width, 0, height }`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(Point::ZERO, self.width as i32, self.height as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        assert!(
            self.in_bounds(x, y),
            "pixel ({}, {}) outside {}x{} buffer",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, c: Color) {
        let i = self.index(x, y);
        self.pixels[i] = c;
    }

    // ---- drawing ------------------------------------------------------------

    pub fn fill(&mut self, c: Color) {
        self.pixels.fill(c);
    }

    /// Solid rectangle. Not clipped: every covered pixel must be in bounds.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, c: Color) {
        for py in y..y + height {
            for px in x..x + width {
                self.put_pixel(px, py, c);
            }
        }
    }

    /// Single-pixel-wide line. The axis with the larger delta drives the loop
    /// (x when `|slope| <= 1`), the other coordinate is computed from the line
    /// equation and truncated. The far endpoint is exclusive.
    pub fn draw_line(&mut self, mut p0: Vec2, mut p1: Vec2, c: Color) {
        let m = if p1.x != p0.x { (p1.y - p0.y) / (p1.x - p0.x) } else { 0.0 };

        if p1.x != p0.x && m.abs() <= 1.0 {
            if p0.x > p1.x {
                std::mem::swap(&mut p0, &mut p1);
            }
            let b = p0.y - m * p0.x;
            for x in (p0.x as i32)..(p1.x as i32) {
                let y = m * x as f32 + b;
                self.put_pixel(x, y as i32, c);
            }
        } else {
            // Coincident endpoints
            if p0.y == p1.y {
                return;
            }
            if p0.y > p1.y {
                std::mem::swap(&mut p0, &mut p1);
            }
            let w = (p1.x - p0.x) / (p1.y - p0.y);
            let p = p0.x - w * p0.y;
            for y in (p0.y as i32)..(p1.y as i32) {
                let x = w * y as f32 + p;
                self.put_pixel(x as i32, y, c);
            }
        }
    }

    // ---- compositing --------------------------------------------------------

    /// Copy `src` into `self` with its top-left corner at `pos`, clipped to
    /// the overlap of both buffers (negative offsets are fine).
    pub fn composite_at(&mut self, src: &PixelBuffer, pos: Point, mode: CompositeMode) {
        let area = self.rect().intersect(&src.rect().moved_by(pos));
        if area.is_empty() {
            return;
        }

        let dst_w = self.width as usize;
        let src_w = src.width as usize;
        let run = area.width() as usize;

        for y in area.top..area.bottom {
            let dst_start = y as usize * dst_w + area.left as usize;
            let src_start = (y - pos.y) as usize * src_w + (area.left - pos.x) as usize;
            let dst_row = &mut self.pixels[dst_start..dst_start + run];
            let src_row = &src.pixels[src_start..src_start + run];

            match mode {
                CompositeMode::Opaque => dst_row.copy_from_slice(src_row),
                CompositeMode::KeyedSource => {
                    for (d, s) in dst_row.iter_mut().zip(src_row) {
                        if !s.is_chroma() {
                            *d = *s;
                        }
                    }
                }
                CompositeMode::KeyedDest => {
                    for (d, s) in dst_row.iter_mut().zip(src_row) {
                        if d.is_chroma() {
                            *d = *s;
                        }
                    }
                }
            }
        }
    }

    /// [`composite_at`](Self::composite_at) anchored at the top-left corner.
    pub fn composite(&mut self, src: &PixelBuffer, mode: CompositeMode) {
        self.composite_at(src, Point::ZERO, mode);
    }

    /// Reallocate to `new_width × new_height`. The new buffer starts out as
    /// chroma and receives the old content top-left anchored; anything outside
    /// the overlap is lost.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        let old = std::mem::replace(self, PixelBuffer::blank(new_width, new_height));
        self.composite(&old, CompositeMode::Opaque);
    }

    /// Smallest rectangle containing every non-sentinel pixel (exclusive
    /// right/bottom), or `None` when the whole buffer is sentinel.
    pub fn non_sentinel_bounds(&self) -> Option<Rect> {
        let w = self.width as i32;
        let h = self.height as i32;
        let row_has_content = |y: i32| (0..w).any(|x| !self.get_pixel(x, y).is_chroma());
        let col_has_content = |x: i32| (0..h).any(|y| !self.get_pixel(x, y).is_chroma());

        let top = (0..h).find(|&y| row_has_content(y))?;
        let bottom = (0..h).rev().find(|&y| row_has_content(y))?;
        let left = (0..w).find(|&x| col_has_content(x))?;
        let right = (0..w).rev().find(|&x| col_has_content(x))?;

        Some(Rect::from_edges(left, right + 1, top, bottom + 1))
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// LAYER STACK – ordered document layers, bottom first
// ============================================================================

/// Hard cap on the number of layers in one document.
pub const MAX_LAYERS: usize = 7;

/// The document: 1..=[`MAX_LAYERS`] equally sized buffers plus the index of
/// the layer that editing tools write to.
#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: Vec<PixelBuffer>,
    selected: usize,
    width: u32,
    height: u32,
}

impl LayerStack {
    /// New document with a single chroma-filled layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(PixelBuffer::blank(width, height))
    }

    /// Single-layer document wrapping an existing image.
    pub fn from_image(image: PixelBuffer) -> Self {
        assert!(!image.is_empty(), "document layers must be at least 1x1");
        Self {
            width: image.width(),
            height: image.height(),
            layers: vec![image],
            selected: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn layer(&self, index: usize) -> Option<&PixelBuffer> {
        self.layers.get(index)
    }

    pub fn active(&self) -> &PixelBuffer {
        &self.layers[self.selected]
    }

    pub fn active_mut(&mut self) -> &mut PixelBuffer {
        &mut self.layers[self.selected]
    }

    /// Append a blank layer and select it. Returns `false` at the layer cap.
    pub fn add_layer(&mut self) -> bool {
        if self.layers.len() >= MAX_LAYERS {
            return false;
        }
        self.layers.push(PixelBuffer::blank(self.width, self.height));
        self.selected = self.layers.len() - 1;
        log_info!("Added layer {} ({} total)", self.selected, self.layers.len());
        true
    }

    /// Append a copy of the top-most layer (not the selected one) and select it.
    /// Returns `false` at the layer cap.
    pub fn duplicate_layer(&mut self) -> bool {
        if self.layers.len() >= MAX_LAYERS {
            return false;
        }
        let top = self.layers[self.layers.len() - 1].clone();
        self.layers.push(top);
        self.selected = self.layers.len() - 1;
        log_info!("Duplicated top layer ({} total)", self.layers.len());
        true
    }

    /// Drop the top-most layer. The selection moves down one step, clamped
    /// to the remaining layers. Refuses to remove the last layer.
    pub fn remove_layer(&mut self) -> bool {
        if self.layers.len() <= 1 {
            return false;
        }
        self.layers.pop();
        self.selected = self.selected.saturating_sub(1).min(self.layers.len() - 1);
        log_info!("Removed top layer ({} left)", self.layers.len());
        true
    }

    /// Make `index` the active layer. Indices past the top are ignored.
    pub fn select_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        self.selected = index;
        true
    }

    /// Resize every layer (top-left anchored, new area is chroma).
    pub fn resize_all(&mut self, width: u32, height: u32) {
        for layer in &mut self.layers {
            layer.resize(width, height);
        }
        self.width = width;
        self.height = height;
        log_info!("Canvas resized to {}x{}", width, height);
    }

    /// Flatten bottom-to-top; sentinel pixels of each layer let the layers
    /// below show through.
    pub fn composite(&self) -> PixelBuffer {
        let mut out = PixelBuffer::blank(self.width, self.height);
        for layer in &self.layers {
            out.composite(layer, CompositeMode::KeyedSource);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Color = Color::rgb(10, 200, 30);

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                buf.put_pixel(x, y, Color::rgb(x as u8, y as u8, 7));
            }
        }
        buf
    }

    #[test]
    fn put_then_get_returns_same_color() {
        let mut buf = PixelBuffer::blank(5, 4);
        for y in 0..4 {
            for x in 0..5 {
                let c = Color::rgb(x as u8 * 10, y as u8 * 10, 1);
                buf.put_pixel(x, y, c);
                assert_eq!(buf.get_pixel(x, y), c);
            }
        }
    }

    #[test]
    #[should_panic(expected = "outside 4x4")]
    fn get_out_of_bounds_panics() {
        PixelBuffer::blank(4, 4).get_pixel(4, 0);
    }

    #[test]
    #[should_panic]
    fn negative_coordinate_panics() {
        PixelBuffer::blank(4, 4).put_pixel(0, -1, C);
    }

    #[test]
    #[should_panic]
    fn draw_rect_is_not_clipped() {
        PixelBuffer::blank(4, 4).draw_rect(2, 2, 3, 1, C);
    }

    #[test]
    fn draw_rect_fills_exact_area() {
        let mut buf = PixelBuffer::blank(4, 4);
        buf.draw_rect(1, 1, 2, 3, C);
        let painted = buf.pixels().iter().filter(|&&p| p == C).count();
        assert_eq!(painted, 6);
        assert_eq!(buf.get_pixel(2, 3), C);
        assert_eq!(buf.get_pixel(3, 3), CHROMA);
    }

    #[test]
    fn horizontal_line_excludes_far_endpoint() {
        let mut buf = PixelBuffer::blank(8, 8);
        buf.draw_line(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), C);
        for x in 0..4 {
            assert_eq!(buf.get_pixel(x, 0), C);
        }
        assert_eq!(buf.get_pixel(4, 0), CHROMA);
        assert_eq!(buf.pixels().iter().filter(|&&p| p == C).count(), 4);
    }

    #[test]
    fn steep_line_steps_along_y() {
        let mut buf = PixelBuffer::blank(8, 8);
        // Reversed endpoints exercise the swap.
        buf.draw_line(Vec2::new(2.0, 6.0), Vec2::new(1.0, 0.0), C);
        // One pixel per row in 0..6, x truncated from the line equation.
        for y in 0..6 {
            let row: Vec<i32> = (0..8).filter(|&x| buf.get_pixel(x, y) == C).collect();
            assert_eq!(row.len(), 1, "row {y}");
        }
        assert_eq!(buf.get_pixel(1, 0), C);
        assert_eq!(buf.get_pixel(1, 5), C);
    }

    #[test]
    fn zero_length_line_draws_nothing() {
        let mut buf = PixelBuffer::blank(3, 3);
        buf.draw_line(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), C);
        assert!(buf.pixels().iter().all(|p| p.is_chroma()));
    }

    #[test]
    fn resize_round_trip_keeps_overlap_and_blanks_the_rest() {
        let original = gradient(6, 5);
        let mut buf = original.clone();
        buf.resize(3, 7);
        buf.resize(6, 5);

        for y in 0..5 {
            for x in 0..6 {
                let expected = if x < 3 { original.get_pixel(x, y) } else { CHROMA };
                assert_eq!(buf.get_pixel(x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn keyed_source_skips_sentinel_pixels() {
        let mut dst = PixelBuffer::new_filled(3, 1, Color::WHITE);
        let src = PixelBuffer::from_pixels(3, 1, vec![C, CHROMA, C]);
        dst.composite(&src, CompositeMode::KeyedSource);
        assert_eq!(dst.pixels(), &[C, Color::WHITE, C]);
    }

    #[test]
    fn keyed_dest_only_fills_sentinel_pixels() {
        let mut dst = PixelBuffer::from_pixels(3, 1, vec![Color::WHITE, CHROMA, CHROMA]);
        let src = PixelBuffer::new_filled(2, 1, C);
        dst.composite(&src, CompositeMode::KeyedDest);
        assert_eq!(dst.pixels(), &[Color::WHITE, C, CHROMA]);
    }

    #[test]
    fn composite_at_clips_negative_and_overhanging_offsets() {
        let mut dst = PixelBuffer::blank(4, 4);
        let src = PixelBuffer::new_filled(3, 3, C);
        dst.composite_at(&src, Point::new(-1, 2), CompositeMode::Opaque);
        let painted: Vec<(i32, i32)> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| dst.get_pixel(x, y) == C)
            .collect();
        assert_eq!(painted, vec![(0, 2), (1, 2), (0, 3), (1, 3)]);

        // Fully outside is a no-op.
        dst.composite_at(&src, Point::new(10, 10), CompositeMode::Opaque);
    }

    #[test]
    fn non_sentinel_bounds_finds_tight_box() {
        let mut buf = PixelBuffer::blank(6, 6);
        assert_eq!(buf.non_sentinel_bounds(), None);
        buf.put_pixel(1, 4, C);
        buf.put_pixel(3, 2, C);
        assert_eq!(buf.non_sentinel_bounds(), Some(Rect::from_edges(1, 4, 2, 5)));
    }

    #[test]
    fn take_leaves_donor_empty() {
        let mut buf = gradient(3, 3);
        let moved = buf.take();
        assert_eq!(moved.size(), Point::new(3, 3));
        assert!(buf.is_empty());
        assert_eq!(buf.size(), Point::ZERO);
    }

    #[test]
    fn clone_is_deep() {
        let a = gradient(2, 2);
        let mut b = a.clone();
        b.put_pixel(0, 0, C);
        assert_ne!(a.get_pixel(0, 0), C);
    }

    // ---- layer stack --------------------------------------------------------

    #[test]
    fn layer_count_stays_within_one_and_seven() {
        let mut stack = LayerStack::new(4, 4);
        let ops: [fn(&mut LayerStack) -> bool; 3] = [
            LayerStack::add_layer,
            LayerStack::duplicate_layer,
            LayerStack::remove_layer,
        ];
        // Deterministic pseudo-random sequence heavy on adds, then on removes.
        let mut seed = 17u32;
        for step in 0..300 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let pick = if step < 150 { (seed >> 16) as usize % 2 } else { 2 };
            ops[pick](&mut stack);
            assert!((1..=MAX_LAYERS).contains(&stack.len()));
            assert!(stack.selected() < stack.len());
        }
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn add_at_cap_is_a_no_op() {
        let mut stack = LayerStack::new(2, 2);
        for _ in 1..MAX_LAYERS {
            assert!(stack.add_layer());
        }
        assert!(!stack.add_layer());
        assert!(!stack.duplicate_layer());
        assert_eq!(stack.len(), MAX_LAYERS);
        assert_eq!(stack.selected(), MAX_LAYERS - 1);
    }

    #[test]
    fn remove_refuses_last_layer() {
        let mut stack = LayerStack::new(2, 2);
        assert!(!stack.remove_layer());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn duplicate_copies_top_of_stack_not_selection() {
        let mut stack = LayerStack::new(2, 2);
        stack.active_mut().put_pixel(0, 0, C);
        stack.add_layer();
        stack.active_mut().put_pixel(1, 1, Color::BLUE);
        stack.select_layer(0);

        assert!(stack.duplicate_layer());
        assert_eq!(stack.selected(), 2);
        let dup = stack.layer(2).unwrap();
        assert_eq!(dup.get_pixel(1, 1), Color::BLUE);
        assert_eq!(dup.get_pixel(0, 0), CHROMA);
    }

    #[test]
    fn remove_moves_selection_down() {
        let mut stack = LayerStack::new(2, 2);
        stack.add_layer();
        stack.add_layer();
        stack.select_layer(0);
        stack.remove_layer();
        assert_eq!(stack.selected(), 0);
        stack.select_layer(1);
        stack.remove_layer();
        assert_eq!(stack.selected(), 0);
        assert!(!stack.select_layer(3));
    }

    #[test]
    fn composite_lets_lower_layers_show_through() {
        let mut stack = LayerStack::new(3, 1);
        stack.active_mut().fill(Color::WHITE);
        stack.add_layer();
        stack.active_mut().put_pixel(1, 0, C);
        stack.add_layer();
        stack.active_mut().put_pixel(2, 0, Color::BLUE);

        let flat = stack.composite();
        assert_eq!(flat.pixels(), &[Color::WHITE, C, Color::BLUE]);
    }

    #[test]
    fn resize_all_resizes_every_layer() {
        let mut stack = LayerStack::new(4, 4);
        stack.active_mut().put_pixel(0, 0, C);
        stack.duplicate_layer();
        stack.resize_all(2, 6);
        for i in 0..stack.len() {
            let layer = stack.layer(i).unwrap();
            assert_eq!(layer.size(), Point::new(2, 6));
            assert_eq!(layer.get_pixel(0, 0), C);
            assert_eq!(layer.get_pixel(1, 5), CHROMA);
        }
        assert_eq!((stack.width(), stack.height()), (2, 6));
    }
}
