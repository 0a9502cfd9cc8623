use std::path::{Path, PathBuf};

use crate::color::Color;

// ============================================================================
// EDITOR SETTINGS — persisted as plain `key=value` lines
// ============================================================================

/// Tunables for a new document and the canvas controller.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Size of a fresh untitled document.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Starting on-screen size of one canvas pixel.
    pub initial_scale: f32,
    /// Zoom clamp. `min_scale` is never allowed below 1.
    pub min_scale: f32,
    pub max_scale: f32,
    /// Multiplier per wheel notch / zoom key press.
    pub zoom_step: f32,
    /// Multiplier per frame while dragging with the zoomer tool.
    pub zoomer_step: f32,
    /// Viewport offset per wheel notch.
    pub scroll_speed: f32,
    /// Viewport offset per frame per held arrow key.
    pub pan_speed: f32,
    pub fast_multiplier: f32,
    pub slow_multiplier: f32,
    /// Checkerboard shown behind transparent canvas pixels.
    pub checker_light: Color,
    pub checker_dark: Color,
    /// Where untitled documents are saved.
    pub output_dir: PathBuf,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            canvas_width: 8,
            canvas_height: 8,
            initial_scale: 10.0,
            min_scale: 1.0,
            max_scale: 128.0,
            zoom_step: 1.2,
            zoomer_step: 1.025,
            scroll_speed: 5.5,
            pan_speed: 2.0,
            fast_multiplier: 5.5,
            slow_multiplier: 0.2,
            checker_light: Color::rgb(255, 255, 255),
            checker_dark: Color::rgb(204, 204, 204),
            output_dir: PathBuf::from("Output"),
        }
    }
}

impl EditorSettings {
    /// Per-user config file location (parent directory is created on demand).
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let config_dir = {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            PathBuf::from(appdata).join("PixelForge")
        };
        #[cfg(target_os = "macos")]
        let config_dir = {
            let home = std::env::var("HOME").ok()?;
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("PixelForge")
        };
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()?
            .join("pixelforge");

        let _ = std::fs::create_dir_all(&config_dir);
        Some(config_dir.join("pixelforge_settings.cfg"))
    }

    /// Load from the per-user file (defaults if missing or unreadable).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            log_warn!("Failed to write settings to {}: {}", path.display(), e);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_config_string())
    }

    /// Parse `key=value` lines. Unknown keys, comments and bad values are
    /// skipped and leave the default in place.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "canvas_width" => set_parsed(&mut s.canvas_width, val),
                "canvas_height" => set_parsed(&mut s.canvas_height, val),
                "initial_scale" => set_parsed(&mut s.initial_scale, val),
                "min_scale" => set_parsed(&mut s.min_scale, val),
                "max_scale" => set_parsed(&mut s.max_scale, val),
                "zoom_step" => set_parsed(&mut s.zoom_step, val),
                "zoomer_step" => set_parsed(&mut s.zoomer_step, val),
                "scroll_speed" => set_parsed(&mut s.scroll_speed, val),
                "pan_speed" => set_parsed(&mut s.pan_speed, val),
                "fast_multiplier" => set_parsed(&mut s.fast_multiplier, val),
                "slow_multiplier" => set_parsed(&mut s.slow_multiplier, val),
                "checker_light" => {
                    if let Some(c) = Color::parse_rgb(val) {
                        s.checker_light = c;
                    }
                }
                "checker_dark" => {
                    if let Some(c) = Color::parse_rgb(val) {
                        s.checker_dark = c;
                    }
                }
                "output_dir" if !val.is_empty() => s.output_dir = PathBuf::from(val),
                _ => {}
            }
        }
        s.sanitize();
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             initial_scale={}\n\
             min_scale={}\n\
             max_scale={}\n\
             zoom_step={}\n\
             zoomer_step={}\n\
             scroll_speed={}\n\
             pan_speed={}\n\
             fast_multiplier={}\n\
             slow_multiplier={}\n\
             checker_light={}\n\
             checker_dark={}\n\
             output_dir={}\n",
            self.canvas_width,
            self.canvas_height,
            self.initial_scale,
            self.min_scale,
            self.max_scale,
            self.zoom_step,
            self.zoomer_step,
            self.scroll_speed,
            self.pan_speed,
            self.fast_multiplier,
            self.slow_multiplier,
            self.checker_light.to_rgb_string(),
            self.checker_dark.to_rgb_string(),
            self.output_dir.display(),
        )
    }

    /// Restore the invariants the controller relies on.
    fn sanitize(&mut self) {
        let d = Self::default();
        if self.canvas_width == 0 {
            self.canvas_width = d.canvas_width;
        }
        if self.canvas_height == 0 {
            self.canvas_height = d.canvas_height;
        }
        if !(self.min_scale.is_finite() && self.min_scale >= 1.0) {
            self.min_scale = 1.0;
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            self.max_scale = self.min_scale.max(d.max_scale);
        }
        if !self.initial_scale.is_finite() {
            self.initial_scale = d.initial_scale;
        }
        self.initial_scale = self.initial_scale.clamp(self.min_scale, self.max_scale);
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            self.zoom_step = d.zoom_step;
        }
        if !(self.zoomer_step.is_finite() && self.zoomer_step > 1.0) {
            self.zoomer_step = d.zoomer_step;
        }
    }
}

fn set_parsed<T: std::str::FromStr>(field: &mut T, val: &str) {
    if let Ok(v) = val.parse() {
        *field = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EditorSettings::parse(""), EditorSettings::default());
    }

    #[test]
    fn non_default_values_survive_a_round_trip() {
        let mut s = EditorSettings::default();
        s.canvas_width = 32;
        s.max_scale = 64.0;
        s.zoom_step = 1.5;
        s.checker_dark = Color::rgb(10, 20, 30);
        s.output_dir = PathBuf::from("exports/today");
        assert_eq!(EditorSettings::parse(&s.to_config_string()), s);
    }

    #[test]
    fn garbage_values_fall_back() {
        let s = EditorSettings::parse(
            "# comment\ncanvas_width=abc\nmin_scale=0.25\nmax_scale=0.5\nchecker_light=1,2\nmystery=1\nno equals sign\n",
        );
        let d = EditorSettings::default();
        assert_eq!(s.canvas_width, d.canvas_width);
        assert_eq!(s.min_scale, 1.0);
        assert!(s.max_scale >= s.min_scale);
        assert_eq!(s.checker_light, d.checker_light);
    }

    #[test]
    fn initial_scale_is_clamped_into_range() {
        let s = EditorSettings::parse("initial_scale=500\nmax_scale=40\n");
        assert_eq!(s.initial_scale, 40.0);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixelforge_settings.cfg");
        let mut s = EditorSettings::default();
        s.pan_speed = 3.5;
        s.save_to(&path).unwrap();
        assert_eq!(EditorSettings::load_from(&path), s);
        assert_eq!(
            EditorSettings::load_from(&dir.path().join("missing.cfg")),
            EditorSettings::default()
        );
    }
}
