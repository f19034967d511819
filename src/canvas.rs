// ============================================================================
// CANVAS — pixel buffer and view↔image coordinate mapping
// ============================================================================

use eframe::egui;
use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

/// Minimum and maximum display zoom factors.
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;

// ---------------------------------------------------------------------------
//  PixelBuffer
// ---------------------------------------------------------------------------

/// A fixed-size raster of 8-bit B,G,R,A samples, row-major with no padding:
/// `stride == width * 4`, `data.len() == height * stride`.
///
/// This is the unit of mutation for every operation. Snapshots never share
/// a buffer — checkpointing clones, so two live history entries can never
/// alias the same pixels.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer filled with a single BGRA value.
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Self {
        assert!(width > 0 && height > 0, "PixelBuffer dimensions must be non-zero");
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
        Self { width, height, data }
    }

    /// Wrap raw BGRA bytes. Returns `None` when the byte count does not
    /// match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Convert from the `image` crate's RGBA representation, swizzling the
    /// channels into BGRA order. Decoders hand us RGBA; everything past the
    /// io boundary is BGRA.
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let src = img.as_raw();
        let mut data = vec![0u8; src.len()];
        for (dst, px) in data.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
            dst[0] = px[2]; // B
            dst[1] = px[1]; // G
            dst[2] = px[0]; // R
            dst[3] = px[3]; // A
        }
        Self { width, height, data }
    }

    /// Convert back to RGBA for encoders and the system clipboard.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = vec![0u8; self.data.len()];
        for (dst, px) in out.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            dst[0] = px[2]; // R
            dst[1] = px[1]; // G
            dst[2] = px[0]; // B
            dst[3] = px[3]; // A
        }
        RgbaImage::from_raw(self.width, self.height, out)
            .expect("buffer length invariant violated")
    }

    /// Build an egui texture image for display.
    pub fn to_color_image(&self) -> egui::ColorImage {
        let pixels = self
            .data
            .chunks_exact(4)
            .map(|px| egui::Color32::from_rgba_unmultiplied(px[2], px[1], px[0], px[3]))
            .collect();
        egui::ColorImage {
            size: [self.width as usize, self.height as usize],
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read one BGRA pixel. Callers must stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride() + x as usize * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Write one BGRA pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let stride = self.stride();
        let i = y as usize * stride + x as usize * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Approximate heap footprint, used by the history pruning logic.
    pub fn memory_bytes(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

// ---------------------------------------------------------------------------
//  ViewTransform — letterboxed view↔image mapping
// ---------------------------------------------------------------------------

/// Maps between view coordinates (relative to the display control's top-left)
/// and image pixel coordinates.
///
/// The image is scaled uniformly to fit the control (`base_scale`), then
/// multiplied by the user zoom and centered, leaving symmetric letterbox
/// margins. `to_image` clamps to the image bounds; `to_view` deliberately
/// does not — a selection rect dragged past the image edge must keep
/// mapping onto the edge pixel while the reverse mapping stays exact for
/// in-bounds rects.
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    control: Vec2,
    image: Vec2,
    zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self {
            control: Vec2::ZERO,
            image: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Update the display control's size (called every frame by the app).
    pub fn set_control_size(&mut self, size: Vec2) {
        self.control = size;
    }

    /// Update the native pixel dimensions of the displayed image.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image = Vec2::new(width as f32, height as f32);
    }

    /// Set the zoom factor, clamped to the [`MIN_ZOOM`]..[`MAX_ZOOM`] range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Uniform aspect-preserving fit scale. Zero when either the control or
    /// the image is degenerate.
    fn base_scale(&self) -> f32 {
        if self.control.x <= 0.0
            || self.control.y <= 0.0
            || self.image.x <= 0.0
            || self.image.y <= 0.0
        {
            return 0.0;
        }
        (self.control.x / self.image.x).min(self.control.y / self.image.y)
    }

    /// Effective display scale (fit scale × zoom).
    pub fn scale(&self) -> f32 {
        self.base_scale() * self.zoom
    }

    /// Top-left of the displayed image within the control (letterbox margin).
    pub fn offset(&self) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (self.control.x - self.image.x * scale) / 2.0,
            (self.control.y - self.image.y * scale) / 2.0,
        )
    }

    /// The rectangle the scaled image occupies, in view coordinates.
    pub fn image_rect(&self) -> Rect {
        let offset = self.offset();
        Rect::from_min_size(Pos2::new(offset.x, offset.y), self.image * self.scale())
    }

    /// View point → image pixel coordinates, clamped to `[0, w] × [0, h]`.
    /// Degenerate scale returns the origin rather than dividing by zero.
    pub fn to_image(&self, view: Pos2) -> Pos2 {
        let scale = self.scale();
        if scale <= 0.0 {
            return Pos2::ZERO;
        }
        let offset = self.offset();
        Pos2::new(
            ((view.x - offset.x) / scale).clamp(0.0, self.image.x),
            ((view.y - offset.y) / scale).clamp(0.0, self.image.y),
        )
    }

    /// Image pixel coordinates → view point. Not clamped: rects fully inside
    /// the image always land inside the control, and that is all the callers
    /// rely on.
    pub fn to_view(&self, image_pt: Pos2) -> Pos2 {
        let scale = self.scale();
        let offset = self.offset();
        Pos2::new(image_pt.x * scale + offset.x, image_pt.y * scale + offset.y)
    }

    /// View rect → image-space rect (both corners clamped).
    pub fn to_image_rect(&self, view_rect: Rect) -> Rect {
        Rect::from_min_max(self.to_image(view_rect.min), self.to_image(view_rect.max))
    }

    /// Image-space rect → view rect (unclamped, see `to_view`).
    pub fn to_view_rect(&self, image_rect: Rect) -> Rect {
        Rect::from_min_max(self.to_view(image_rect.min), self.to_view(image_rect.max))
    }
}
