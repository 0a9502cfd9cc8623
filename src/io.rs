use image::{ImageError, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

use crate::canvas::PixelBuffer;
use crate::color::Color;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a byte slice could not be read as a bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the file header plus a 40-byte info header.
    TooShort(usize),
    BadMagic([u8; 2]),
    /// Info header smaller than `BITMAPINFOHEADER` (e.g. the 12-byte OS/2 core header).
    UnsupportedHeader(u32),
    UnsupportedBitDepth(u16),
    UnsupportedCompression(u32),
    BadDimensions(i32, i32),
    /// Pixel data runs past the end of the input.
    Truncated { needed: usize, available: usize },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::TooShort(n) => write!(f, "bitmap too short ({} bytes)", n),
            DecodeError::BadMagic(m) => write!(f, "not a bitmap (magic {:02X} {:02X})", m[0], m[1]),
            DecodeError::UnsupportedHeader(n) => {
                write!(f, "unsupported {}-byte info header (need at least {})", n, INFO_HEADER_LEN)
            }
            DecodeError::UnsupportedBitDepth(b) => {
                write!(f, "unsupported bit depth {} (expected 24 or 32)", b)
            }
            DecodeError::UnsupportedCompression(c) => {
                write!(f, "unsupported compression {} (only uncompressed bitmaps)", c)
            }
            DecodeError::BadDimensions(w, h) => write!(f, "invalid bitmap dimensions {}x{}", w, h),
            DecodeError::Truncated { needed, available } => write!(
                f,
                "pixel data truncated: need {} bytes, have {}",
                needed, available
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Error type for loading and saving documents.
#[derive(Debug)]
pub enum ImageIoError {
    Io(std::io::Error),
    Decode(DecodeError),
    Image(ImageError),
}

impl std::fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageIoError::Io(e) => write!(f, "I/O error: {}", e),
            ImageIoError::Decode(e) => write!(f, "Bitmap error: {}", e),
            ImageIoError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for ImageIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageIoError::Io(e) => Some(e),
            ImageIoError::Decode(e) => Some(e),
            ImageIoError::Image(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ImageIoError {
    fn from(e: std::io::Error) -> Self {
        ImageIoError::Io(e)
    }
}

impl From<DecodeError> for ImageIoError {
    fn from(e: DecodeError) -> Self {
        ImageIoError::Decode(e)
    }
}

impl From<ImageError> for ImageIoError {
    fn from(e: ImageError) -> Self {
        ImageIoError::Image(e)
    }
}

// ============================================================================
// BITMAP CODEC
// ============================================================================

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;
const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn read_i32(b: &[u8], at: usize) -> i32 {
    read_u32(b, at) as i32
}

/// Decode an uncompressed 24- or 32-bit Windows bitmap.
///
/// A negative height in the info header means rows are stored top-down,
/// otherwise bottom-up. 24-bit rows are padded to a multiple of 4 bytes;
/// the fourth byte of a 32-bit pixel is ignored.
pub fn decode_bitmap(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TooShort(bytes.len()));
    }
    if &bytes[0..2] != b"BM" {
        return Err(DecodeError::BadMagic([bytes[0], bytes[1]]));
    }

    let data_offset = read_u32(bytes, 10) as usize;
    let info = FILE_HEADER_LEN;
    let info_len = read_u32(bytes, info);
    if (info_len as usize) < INFO_HEADER_LEN {
        return Err(DecodeError::UnsupportedHeader(info_len));
    }
    let width = read_i32(bytes, info + 4);
    let raw_height = read_i32(bytes, info + 8);
    let bit_count = read_u16(bytes, info + 14);
    let compression = read_u32(bytes, info + 16);

    if bit_count != 24 && bit_count != 32 {
        return Err(DecodeError::UnsupportedBitDepth(bit_count));
    }
    if compression != 0 {
        return Err(DecodeError::UnsupportedCompression(compression));
    }
    if width <= 0 || raw_height == 0 || raw_height == i32::MIN {
        return Err(DecodeError::BadDimensions(width, raw_height));
    }

    let top_down = raw_height < 0;
    let height = raw_height.unsigned_abs();
    let width = width as u32;

    let bytes_per_pixel = bit_count as usize / 8;
    let row_len = width as usize * bytes_per_pixel;
    let padding = if bit_count == 24 { (4 - row_len % 4) % 4 } else { 0 };
    let stride = row_len + padding;

    let needed = data_offset
        .checked_add(stride.checked_mul(height as usize).unwrap_or(usize::MAX))
        .unwrap_or(usize::MAX);
    // The last row's padding is not required to be present.
    let needed = needed.saturating_sub(padding);
    if bytes.len() < needed {
        return Err(DecodeError::Truncated { needed, available: bytes.len() });
    }

    let mut buf = PixelBuffer::new(width, height);
    for row in 0..height as usize {
        let y = if top_down { row } else { height as usize - 1 - row };
        let start = data_offset + row * stride;
        for (x, px) in bytes[start..start + row_len].chunks_exact(bytes_per_pixel).enumerate() {
            buf.put_pixel(x as i32, y as i32, Color::rgb(px[2], px[1], px[0]));
        }
    }
    Ok(buf)
}

/// Encode as an uncompressed 24-bit bottom-up bitmap. The chroma sentinel is
/// written as plain magenta.
pub fn encode_bitmap(buf: &PixelBuffer) -> Vec<u8> {
    let width = buf.width() as usize;
    let height = buf.height() as usize;
    let row_len = width * 3;
    let padding = (4 - row_len % 4) % 4;
    let image_size = (row_len + padding) * height;
    let file_size = HEADER_LEN + image_size;

    let mut out = Vec::with_capacity(file_size);
    // File header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
    // Info header
    out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(image_size as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes()); // 72 DPI
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    for y in (0..height).rev() {
        for &c in &buf.pixels()[y * width..(y + 1) * width] {
            out.extend_from_slice(&[c.b(), c.g(), c.r()]);
        }
        out.extend(std::iter::repeat_n(0u8, padding));
    }
    out
}

// ============================================================================
// RGBA BRIDGING
// ============================================================================

/// Alpha-0 pixels become the chroma sentinel, everything else is opaque.
pub fn buffer_from_rgba(img: &RgbaImage) -> PixelBuffer {
    let pixels = img.pixels().map(|&p| Color::from_rgba(p)).collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}

/// The chroma sentinel becomes fully transparent.
pub fn buffer_to_rgba(buf: &PixelBuffer) -> RgbaImage {
    let mut raw = Vec::with_capacity(buf.pixels().len() * 4);
    for &c in buf.pixels() {
        let Rgba(px) = c.to_rgba();
        raw.extend_from_slice(&px);
    }
    // Length always matches width * height * 4.
    RgbaImage::from_raw(buf.width(), buf.height(), raw).unwrap_or_default()
}

// ============================================================================
// FILE LOAD / SAVE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Bmp,
    Png,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Bmp => "bmp",
            SaveFormat::Png => "png",
        }
    }

    /// Case-insensitive lookup by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bmp" => Some(SaveFormat::Bmp),
            "png" => Some(SaveFormat::Png),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }
}

/// Load any supported image file. `.bmp` goes through [`decode_bitmap`],
/// every other format through the `image` crate.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageIoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let result = if ext == "bmp" {
        let bytes = fs::read(path)?;
        decode_bitmap(&bytes).map_err(ImageIoError::from)
    } else {
        image::open(path)
            .map_err(ImageIoError::from)
            .and_then(|img| ensure_not_empty(buffer_from_rgba(&img.to_rgba8())).map_err(ImageIoError::from))
    };

    match &result {
        Ok(buf) => log_info!("Loaded {} ({}x{})", path.display(), buf.width(), buf.height()),
        Err(e) => log_err!("Failed to load {}: {}", path.display(), e),
    }
    result
}

/// Zero-area images cannot back a document.
fn ensure_not_empty(buf: PixelBuffer) -> Result<PixelBuffer, DecodeError> {
    if buf.is_empty() {
        return Err(DecodeError::BadDimensions(buf.width() as i32, buf.height() as i32));
    }
    Ok(buf)
}

/// Write `buf` to `path`, creating the parent directory if needed.
pub fn save_image(buf: &PixelBuffer, path: &Path, format: SaveFormat) -> Result<(), ImageIoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match format {
        SaveFormat::Bmp => fs::write(path, encode_bitmap(buf))?,
        SaveFormat::Png => buffer_to_rgba(buf).save_with_format(path, ImageFormat::Png)?,
    }

    log_info!(
        "Saved {}x{} {} to {}",
        buf.width(),
        buf.height(),
        format.extension(),
        path.display()
    );
    Ok(())
}
