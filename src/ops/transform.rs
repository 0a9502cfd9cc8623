// ============================================================================
// TRANSFORM OPERATIONS — expand, resample, flip and clip pixel buffers
// ============================================================================
//
// Every transform here returns a new buffer; the source is left untouched.

use crate::canvas::PixelBuffer;
use crate::color::Color;
use crate::geometry::{Point, Rect};

impl PixelBuffer {
    /// Nearest-neighbour upscale: every source pixel becomes a solid
    /// `factor.x × factor.y` block. Used for pixel-perfect zoom rendering.
    pub fn expanded_by(&self, factor: Point) -> PixelBuffer {
        assert!(
            factor.x >= 1 && factor.y >= 1,
            "expansion factor must be at least 1x1, got {}x{}",
            factor.x,
            factor.y
        );
        let (fx, fy) = (factor.x as usize, factor.y as usize);
        let src_w = self.width() as usize;
        let dst_w = src_w * fx;
        let src = self.pixels();

        let mut out = Vec::with_capacity(dst_w * self.height() as usize * fy);
        for row in src.chunks_exact(src_w.max(1)).take(self.height() as usize) {
            let start = out.len();
            for &c in row {
                out.extend(std::iter::repeat_n(c, fx));
            }
            // Repeat the widened row for the remaining block lines.
            for _ in 1..fy {
                out.extend_from_within(start..start + dst_w);
            }
        }

        PixelBuffer::from_pixels(self.width() * fx as u32, self.height() * fy as u32, out)
    }

    /// Bilinear resample to `width × height`.
    ///
    /// Each target pixel maps to `(x / width * (src_w - 1), y / height * (src_h - 1))`
    /// in the source; the three colour channels are blended independently
    /// between the four surrounding pixels using the fractional parts as
    /// weights and truncated. Neighbour lookups clamp to the last row/column.
    pub fn interpolated_to(&self, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        if self.is_empty() {
            return out;
        }

        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;

        for y in 0..height as i32 {
            let gy = y as f32 / height as f32 * max_y as f32;
            let gyi = gy as i32;
            let ty = gy - gyi as f32;
            let gyn = (gyi + 1).min(max_y);

            for x in 0..width as i32 {
                let gx = x as f32 / width as f32 * max_x as f32;
                let gxi = gx as i32;
                let tx = gx - gxi as f32;
                let gxn = (gxi + 1).min(max_x);

                let c00 = self.get_pixel(gxi, gyi);
                let c10 = self.get_pixel(gxn, gyi);
                let c01 = self.get_pixel(gxi, gyn);
                let c11 = self.get_pixel(gxn, gyn);

                let mut packed = 0u32;
                for i in 0..3 {
                    let v = blerp(
                        c00.channel(i) as f32,
                        c10.channel(i) as f32,
                        c01.channel(i) as f32,
                        c11.channel(i) as f32,
                        tx,
                        ty,
                    );
                    packed |= (v as u32 & 0xFF) << (i * 8);
                }
                out.put_pixel(x, y, Color(packed));
            }
        }
        out
    }

    /// Mirror left↔right.
    pub fn flipped_horizontal(&self) -> PixelBuffer {
        let w = self.width() as usize;
        let mut pixels = self.pixels().to_vec();
        for row in pixels.chunks_exact_mut(w.max(1)) {
            row.reverse();
        }
        PixelBuffer::from_pixels(self.width(), self.height(), pixels)
    }

    /// Mirror top↔bottom.
    pub fn flipped_vertical(&self) -> PixelBuffer {
        let w = self.width() as usize;
        let mut pixels = Vec::with_capacity(self.pixels().len());
        for row in self.pixels().chunks_exact(w.max(1)).rev() {
            pixels.extend_from_slice(row);
        }
        PixelBuffer::from_pixels(self.width(), self.height(), pixels)
    }

    /// Copy optionally flipped over either axis.
    pub fn flipped(&self, horizontal: bool, vertical: bool) -> PixelBuffer {
        match (horizontal, vertical) {
            (false, false) => self.clone(),
            (true, false) => self.flipped_horizontal(),
            (false, true) => self.flipped_vertical(),
            (true, true) => self.flipped_horizontal().flipped_vertical(),
        }
    }

    /// Extract `clip` into a new buffer of the same size. The rectangle must
    /// lie inside this buffer.
    pub fn clipped(&self, clip: &Rect) -> PixelBuffer {
        assert!(
            clip.width() >= 0 && clip.height() >= 0 && clip.is_contained_by(&self.rect()),
            "clip {:?} outside {}x{} buffer",
            clip,
            self.width(),
            self.height()
        );
        let mut pixels = Vec::with_capacity(clip.width() as usize * clip.height() as usize);
        let w = self.width() as usize;
        for y in clip.top..clip.bottom {
            let start = y as usize * w + clip.left as usize;
            pixels.extend_from_slice(&self.pixels()[start..start + clip.width() as usize]);
        }
        PixelBuffer::from_pixels(clip.width() as u32, clip.height() as u32, pixels)
    }

    /// [`clipped`](Self::clipped) between two corner points (either diagonal).
    pub fn cropped(&self, start: Point, end: Point) -> PixelBuffer {
        self.clipped(&Rect::from_corners(start, end))
    }

    /// Crop away the sentinel border. `None` when nothing but sentinel remains.
    pub fn trimmed(&self) -> Option<PixelBuffer> {
        self.non_sentinel_bounds().map(|bounds| self.clipped(&bounds))
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn blerp(c00: f32, c10: f32, c01: f32, c11: f32, tx: f32, ty: f32) -> f32 {
    lerp(lerp(c00, c10, tx), lerp(c01, c11, tx), ty)
}
