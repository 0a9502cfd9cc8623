use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::canvas::LayerStack;
use crate::color::Palette;
use crate::components::tools::ToolMode;
use crate::controller::{CanvasController, FrameOutcome};
use crate::geometry::Rect;
use crate::input::FrameInput;
use crate::io::{self, ImageIoError, SaveFormat};
use crate::settings::EditorSettings;

/// Single open document.
#[derive(Debug)]
pub struct Document {
    pub id: Uuid,
    pub controller: CanvasController,
    /// `None` for unsaved/untitled documents.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
    /// Display name (file name, or "Untitled-N")
    pub name: String,
    /// Directory untitled documents are saved into.
    output_dir: PathBuf,
}

impl Document {
    pub fn new_untitled(untitled_counter: usize, clip_area: Rect, settings: &EditorSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            controller: CanvasController::new(clip_area, settings),
            path: None,
            is_dirty: false,
            name: format!("Untitled-{}", untitled_counter),
            output_dir: settings.output_dir.clone(),
        }
    }

    /// Open an image file as a single-layer document.
    pub fn open(path: &Path, clip_area: Rect, settings: &EditorSettings) -> Result<Self, ImageIoError> {
        // `load_image` never returns a zero-area buffer.
        let image = io::load_image(path)?;
        let layers = LayerStack::from_image(image);
        Ok(Self {
            id: Uuid::new_v4(),
            controller: CanvasController::with_layers(clip_area, settings, layers),
            path: Some(path.to_path_buf()),
            is_dirty: false,
            name: file_name_of(path),
            output_dir: settings.output_dir.clone(),
        })
    }

    /// Run one controller frame, track the dirty flag and honour the save
    /// shortcut. A failed save is logged and leaves the document dirty.
    pub fn update(&mut self, input: &FrameInput, tool: ToolMode, palette: &mut Palette) -> FrameOutcome {
        let outcome = self.controller.update(input, tool, palette);
        if outcome.canvas_changed {
            self.mark_dirty();
        }
        if outcome.save_requested
            && let Err(e) = self.save()
        {
            log_err!("Save of {} failed: {}", self.name, e);
        }
        outcome
    }

    /// Where [`save`](Self::save) writes: the opened path, or
    /// `<output_dir>/<name>.bmp` for untitled documents.
    pub fn save_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => p.clone(),
            None => self.output_dir.join(format!("{}.bmp", self.name)),
        }
    }

    /// Flatten all layers and write them out. The format follows the file
    /// extension; anything other than `.png` is written as a bitmap.
    pub fn save(&mut self) -> Result<PathBuf, ImageIoError> {
        let path = self.save_path();
        let format = SaveFormat::from_path(&path).unwrap_or(SaveFormat::Bmp);
        io::save_image(&self.controller.layers().composite(), &path, format)?;
        self.mark_clean();
        Ok(path)
    }

    /// Save under a new path and adopt it as the document's path.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf, ImageIoError> {
        self.path = Some(path.to_path_buf());
        self.update_name_from_path();
        self.save()
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn update_name_from_path(&mut self) {
        if let Some(ref path) = self.path {
            self.name = file_name_of(path);
        }
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::input::Key;

    fn clip() -> Rect {
        Rect::from_edges(0, 400, 0, 300)
    }

    fn settings_in(dir: &Path) -> EditorSettings {
        EditorSettings { output_dir: dir.join("Output"), ..EditorSettings::default() }
    }

    #[test]
    fn painting_marks_dirty_and_save_shortcut_writes_bitmap() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new_untitled(1, clip(), &settings_in(dir.path()));
        assert_eq!(doc.display_title(), "Untitled-1");

        let mut pal = Palette { primary: Color::RED, secondary: Color::WHITE };
        doc.update(&FrameInput::at(Point::new(5, 5)).with_primary(), ToolMode::Brush, &mut pal);
        assert!(doc.is_dirty);
        assert_eq!(doc.display_title(), "Untitled-1*");

        let out = doc.update(&FrameInput::at(Point::new(500, 500)).with_key(Key::Save), ToolMode::Brush, &mut pal);
        assert!(out.save_requested);
        assert!(!doc.is_dirty);

        let saved = io::load_image(&dir.path().join("Output").join("Untitled-1.bmp")).unwrap();
        assert_eq!(saved.size(), Point::new(8, 8));
        assert_eq!(saved.get_pixel(0, 0), Color::RED);
    }

    #[test]
    fn open_and_save_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("sprite.bmp");
        let mut image = crate::canvas::PixelBuffer::blank(3, 2);
        image.put_pixel(2, 1, Color::GREEN);
        io::save_image(&image, &src, SaveFormat::Bmp).unwrap();

        let mut doc = Document::open(&src, clip(), &EditorSettings::default()).unwrap();
        assert_eq!(doc.name, "sprite.bmp");
        assert_eq!(doc.controller.canvas_size(), Point::new(3, 2));

        let png = dir.path().join("sprite.png");
        assert_eq!(doc.save_as(&png).unwrap(), png);
        assert_eq!(doc.name, "sprite.png");
        assert_eq!(io::load_image(&png).unwrap(), image);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Document::open(&dir.path().join("none.png"), clip(), &EditorSettings::default()).is_err());
    }
}
