// ============================================================================
// PixelForge CLI — headless batch processing of pixel-art files
// ============================================================================
//
// Usage examples:
//   PixelForge -i sprite.bmp --trim -o sprite_trimmed.bmp
//   PixelForge -i icon.png --expand 4 -f png            (writes icon_out.png)
//   PixelForge -i "tiles/*.bmp" --resize 16x16 --output-dir out/
//   PixelForge -i hero.png --scale 32x48 --flip-h -o hero_left.png
//
// Every input goes through the same pipeline:
//   load → trim → resize → scale → expand → flip → save

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::PixelBuffer;
use crate::geometry::Point;
use crate::io::{SaveFormat, load_image, save_image};

/// Largest accepted `--expand` factor.
pub const MAX_EXPAND: u32 = 1024;
/// Largest output side length, in pixels.
pub const MAX_SIDE: u32 = 65_536;
/// Largest output area (256 MiB of packed pixels).
pub const MAX_PIXELS: u64 = 1 << 26;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PixelForge headless pixel-art processor.
#[derive(Parser, Debug)]
#[command(
    name = "PixelForge",
    version,
    about = "PixelForge headless batch processor for pixel-art images",
    long_about = "Trim, resize, rescale, expand and flip BMP/PNG images without\n\
                  opening an editor. Magenta (255,0,255) and fully transparent\n\
                  pixels are treated as empty.\n\n\
                  Example:\n  \
                  PixelForge -i sprite.bmp --trim --expand 8 -o sprite_big.png\n  \
                  PixelForge -i \"tiles/*.bmp\" --resize 16x16 --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.bmp", "sprites/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (original stem + format extension).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: bmp or png. Inferred from --output when omitted, else bmp.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Crop away the empty (magenta) border.
    #[arg(long)]
    pub trim: bool,

    /// Resize the canvas (top-left anchored, new area left empty).
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub resize: Option<(u32, u32)>,

    /// Resample the image to this size with bilinear filtering.
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub scale: Option<(u32, u32)>,

    /// Blow every pixel up to an N×N block.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_EXPAND as i64))]
    pub expand: Option<u32>,

    /// Mirror left-right.
    #[arg(long)]
    pub flip_h: bool,

    /// Mirror top-bottom.
    #[arg(long)]
    pub flip_v: bool,

    /// Print per-file timing and sizes.
    #[arg(short, long)]
    pub verbose: bool,
}

/// The per-file transform steps selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub trim: bool,
    pub resize: Option<(u32, u32)>,
    pub scale: Option<(u32, u32)>,
    pub expand: Option<u32>,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl From<&CliArgs> for Pipeline {
    fn from(args: &CliArgs) -> Self {
        Self {
            trim: args.trim,
            resize: args.resize,
            scale: args.scale,
            expand: args.expand,
            flip_h: args.flip_h,
            flip_v: args.flip_v,
        }
    }
}

impl Pipeline {
    /// Run every selected step in order. Steps that would produce an empty
    /// or oversized image fail instead of allocating it.
    pub fn apply(&self, mut image: PixelBuffer) -> Result<PixelBuffer, String> {
        if self.trim {
            image = image
                .trimmed()
                .ok_or_else(|| "image is empty after trimming".to_string())?;
        }
        if let Some((w, h)) = self.resize {
            check_output_size(w, h)?;
            image.resize(w, h);
        }
        if let Some((w, h)) = self.scale {
            check_output_size(w, h)?;
            image = image.interpolated_to(w, h);
        }
        if let Some(n) = self.expand {
            let (Some(w), Some(h)) = (image.width().checked_mul(n), image.height().checked_mul(n)) else {
                return Err(format!("expanding by {} overflows the image size", n));
            };
            check_output_size(w, h)?;
            // n <= w <= MAX_SIDE, so it fits an i32.
            image = image.expanded_by(Point::new(n as i32, n as i32));
        }
        if self.flip_h || self.flip_v {
            image = image.flipped(self.flip_h, self.flip_v);
        }
        Ok(image)
    }
}

fn check_output_size(width: u32, height: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("output size {}x{} is empty", width, height));
    }
    if width > MAX_SIDE || height > MAX_SIDE || width as u64 * height as u64 > MAX_PIXELS {
        return Err(format!(
            "output size {}x{} is too large (limit {} per side, {} pixels)",
            width, height, MAX_SIDE, MAX_PIXELS
        ));
    }
    Ok(())
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = setup failed or one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    match run_batch(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Process every input. Returns the number of files that failed, or an error
/// when nothing could be attempted at all.
fn run_batch(args: &CliArgs) -> Result<usize, String> {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        return Err("no input files matched the given pattern(s).".to_string());
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        return Err(format!(
            "{} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        ));
    }

    let save_format = parse_format(args.format.as_deref(), args.output.as_deref())?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("could not create output directory '{}': {}", dir.display(), e))?;
    }

    let pipeline = Pipeline::from(args);
    let total = inputs.len();
    let multi = total > 1;
    let mut failures = 0;
    log_info!("CLI batch: {} file(s), {:?}", total, pipeline);

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            failures += 1;
            continue;
        };

        match run_one(input_path, &output_path, &pipeline, save_format) {
            Ok(size) => {
                if args.verbose || multi {
                    println!(
                        "  → {} {}x{} ({:.0}ms)",
                        output_path.display(),
                        size.x,
                        size.y,
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log_err!("{}: {}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

// ============================================================================
// Per-file processing
// ============================================================================

/// Load, transform and save one file. Returns the written image size.
fn run_one(input: &Path, output: &Path, pipeline: &Pipeline, format: SaveFormat) -> Result<Point, String> {
    let image = load_image(input).map_err(|e| format!("load failed: {}", e))?;
    let image = pipeline.apply(image)?;
    save_image(&image, output, format).map_err(|e| format!("save failed: {}", e))?;
    Ok(image.size())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);
        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// `"WxH"` (also `"W,H"`) with both sides non-zero.
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X', ','])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{}'", s))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be at least 1x1, got '{}'", s));
    }
    Ok((w, h))
}

/// `--format` wins, then the `--output` extension, then bitmap.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return SaveFormat::from_extension(f)
            .ok_or_else(|| format!("unknown format '{}' (expected bmp or png)", f));
    }
    Ok(output.and_then(SaveFormat::from_path).unwrap_or(SaveFormat::Bmp))
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output`
/// 2. `--output-dir` + input stem
/// 3. next to the input, `_out` appended when it would overwrite the input
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
