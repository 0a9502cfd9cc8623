// ============================================================================
// COLOR — packed 32-bit pixel value and the chroma (transparency) sentinel
// ============================================================================

use image::Rgba;
use std::fmt;

/// Packed pixel colour laid out as `0xXXRRGGBB`.
///
/// The high byte is an unused "extra" byte. Colours built from r/g/b always
/// leave it at zero, so equality is a plain bitwise compare of the word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

/// Reserved "no content" colour. Pixels equal to this are transparent for
/// keyed compositing, erasing, export and rendering overlays.
pub const CHROMA: Color = Color::rgb(255, 0, 255);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Channel `i` counted from the least significant byte (0 = blue, 1 = green, 2 = red).
    #[inline]
    pub const fn channel(self, i: u32) -> u8 {
        (self.0 >> (i * 8)) as u8
    }

    #[inline]
    pub fn is_chroma(self) -> bool {
        self == CHROMA
    }

    /// Convert to straight RGBA. The sentinel becomes fully transparent.
    pub fn to_rgba(self) -> Rgba<u8> {
        if self.is_chroma() {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([self.r(), self.g(), self.b(), 255])
        }
    }

    /// Convert from straight RGBA. Any fully transparent pixel maps to the sentinel;
    /// partial alpha is dropped since the canvas has no alpha channel.
    pub fn from_rgba(px: Rgba<u8>) -> Self {
        if px[3] == 0 {
            CHROMA
        } else {
            Color::rgb(px[0], px[1], px[2])
        }
    }

    /// Parse `"r,g,b"` (used by the settings file).
    pub fn parse_rgb(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Color::rgb(r, g, b))
    }

    pub fn to_rgb_string(self) -> String {
        format!("{},{},{}", self.r(), self.g(), self.b())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08X})", self.0)
    }
}

/// Primary / secondary colour pair edited by the sampler and used by the paint tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self { primary: Color::BLACK, secondary: Color::WHITE }
    }
}
