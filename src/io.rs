// ============================================================================
// FILE IO — decoding/encoding images and the native open/save dialogs
// ============================================================================

use rfd::FileDialog;
use std::path::{Path, PathBuf};

use crate::canvas::PixelBuffer;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// Decode an image file into a pixel buffer. Any decode failure (missing
/// file, unsupported format, corrupt data) surfaces as a message string —
/// callers show it as a warning and leave the session untouched.
pub fn load_image(path: &Path) -> Result<PixelBuffer, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
    Ok(PixelBuffer::from_rgba_image(&img.to_rgba8()))
}

/// Encode a pixel buffer to the format implied by the path's extension.
/// JPEG cannot carry an alpha channel, so it is flattened to RGB first.
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<(), String> {
    let rgba = buffer.to_rgba_image();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let result = match ext.as_str() {
        "jpg" | "jpeg" => image::DynamicImage::ImageRgba8(rgba).to_rgb8().save(path),
        _ => rgba.save(path),
    };
    result.map_err(|e| format!("Failed to save {}: {}", path.display(), e))
}

/// Tracks the file currently being edited and drives the native dialogs.
#[derive(Default)]
pub struct FileHandler {
    current_path: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self { current_path: None }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Show the open dialog and decode the chosen file.
    /// Returns the loaded buffer and its path, or `None` when cancelled.
    /// Decode failures are reported through the `Err` side so the caller
    /// can distinguish "cancelled" from "broken file".
    pub fn open_image(&mut self, start_dir: Option<&Path>) -> Result<Option<(PixelBuffer, PathBuf)>, String> {
        let mut dialog = FileDialog::new().add_filter("Images", &IMAGE_EXTENSIONS);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return Ok(None);
        };

        let buffer = load_image(&path)?;
        self.current_path = Some(path.clone());
        Ok(Some((buffer, path)))
    }

    /// Re-decode the current file from disk (discarding in-session edits is
    /// the caller's decision — this only produces the fresh buffer).
    pub fn reload_image(&self) -> Result<Option<PixelBuffer>, String> {
        match &self.current_path {
            Some(path) => load_image(path).map(Some),
            None => Ok(None),
        }
    }

    /// Show the save dialog and encode the buffer to the chosen path.
    /// Returns the saved path, or `None` when cancelled.
    pub fn save_image_as(
        &mut self,
        buffer: &PixelBuffer,
        start_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>, String> {
        let mut dialog = FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .add_filter("JPEG Image", &["jpg", "jpeg"])
            .add_filter("Bitmap", &["bmp"])
            .add_filter("TIFF Image", &["tiff", "tif"]);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = self
            .current_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
        {
            dialog = dialog.set_file_name(&format!("{}.png", name));
        }
        let Some(path) = dialog.save_file() else {
            return Ok(None);
        };

        save_image(buffer, &path)?;
        self.current_path = Some(path.clone());
        Ok(Some(path))
    }
}
