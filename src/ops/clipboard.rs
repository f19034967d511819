// ============================================================================
// CLIPBOARD OPERATIONS — region crop/clear/paste and the clipboard slot
// ============================================================================

use eframe::egui::Rect;
use std::sync::Mutex;

use crate::canvas::PixelBuffer;

// ---------------------------------------------------------------------------
//  Internal clipboard (application-level, supports transparency)
// ---------------------------------------------------------------------------

/// Single-slot in-app clipboard. Process-scoped: it outlives the session
/// that wrote it, and the last write wins.
static APP_CLIPBOARD: Mutex<Option<PixelBuffer>> = Mutex::new(None);

/// Store a region in the app clipboard and mirror it to the OS clipboard.
pub fn set_clipboard(region: PixelBuffer) {
    copy_to_system_clipboard(&region);
    *APP_CLIPBOARD.lock().unwrap_or_else(|e| e.into_inner()) = Some(region);
}

/// Retrieve a clone from the app clipboard, falling back to whatever image
/// the OS clipboard holds (e.g. a screenshot taken outside the app).
pub fn get_clipboard() -> Option<PixelBuffer> {
    if let Some(region) = APP_CLIPBOARD.lock().unwrap_or_else(|e| e.into_inner()).clone() {
        return Some(region);
    }
    get_from_system_clipboard()
}

pub fn has_clipboard_content() -> bool {
    if APP_CLIPBOARD.lock().unwrap_or_else(|e| e.into_inner()).is_some() {
        return true;
    }
    // Cheap dimension probe of the OS clipboard.
    arboard::Clipboard::new()
        .and_then(|mut clip| clip.get_image().map(|img| img.width > 0 && img.height > 0))
        .unwrap_or(false)
}

/// Drop the app-level slot (the OS clipboard is left alone). Test hook and
/// session-reset helper.
pub fn clear_clipboard() {
    *APP_CLIPBOARD.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

// ---------------------------------------------------------------------------
//  System clipboard helpers (OS-level copy/paste via arboard)
// ---------------------------------------------------------------------------

/// Write a region to the system clipboard. arboard wants RGBA order.
fn copy_to_system_clipboard(region: &PixelBuffer) {
    if let Ok(mut clip) = arboard::Clipboard::new() {
        let rgba = region.to_rgba_image();
        let data = arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: std::borrow::Cow::Owned(rgba.into_raw()),
        };
        let _ = clip.set_image(data);
    }
}

/// Try to read an image from the system clipboard. Handles raw image data
/// and text content that happens to be a valid image file path.
fn get_from_system_clipboard() -> Option<PixelBuffer> {
    if let Ok(mut clip) = arboard::Clipboard::new() {
        if let Ok(img_data) = clip.get_image() {
            if let Some(rgba) = image::RgbaImage::from_raw(
                img_data.width as u32,
                img_data.height as u32,
                img_data.bytes.into_owned(),
            ) {
                return Some(PixelBuffer::from_rgba_image(&rgba));
            }
        }
        if let Ok(text) = clip.get_text() {
            let path = std::path::Path::new(text.trim());
            if path.is_file() {
                if let Ok(dyn_img) = image::open(path) {
                    return Some(PixelBuffer::from_rgba_image(&dyn_img.to_rgba8()));
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
//  Region primitives
// ---------------------------------------------------------------------------

/// Intersect an image-space rect with the buffer bounds and truncate to
/// whole pixels. `None` when nothing remains.
fn clamp_rect(buffer: &PixelBuffer, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.min.x.max(0.0) as u32;
    let y0 = rect.min.y.max(0.0) as u32;
    let x1 = (rect.max.x.min(buffer.width() as f32)) as u32;
    let y1 = (rect.max.y.min(buffer.height() as f32)) as u32;
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

/// Extract a sub-rectangle as a new buffer. The rect is intersected with the
/// source bounds first; an empty intersection is a no-op (`None`), not an
/// error — edge drags routinely produce degenerate rects.
pub fn crop(source: &PixelBuffer, rect: Rect) -> Option<PixelBuffer> {
    let (x0, y0, w, h) = clamp_rect(source, rect)?;
    let stride = source.stride();
    let src = source.as_slice();
    let mut data = Vec::with_capacity(w as usize * h as usize * 4);
    for y in y0..y0 + h {
        let row_start = y as usize * stride + x0 as usize * 4;
        data.extend_from_slice(&src[row_start..row_start + w as usize * 4]);
    }
    PixelBuffer::from_raw(w, h, data)
}

/// Return a copy of the source with every pixel inside the (clamped) rect
/// zeroed in all four channels — fully transparent black. `None` when the
/// intersection is empty.
pub fn clear_region(source: &PixelBuffer, rect: Rect) -> Option<PixelBuffer> {
    let (x0, y0, w, h) = clamp_rect(source, rect)?;
    let mut result = source.clone();
    let stride = result.stride();
    let dst = result.as_mut_slice();
    for y in y0..y0 + h {
        let row_start = y as usize * stride + x0 as usize * 4;
        dst[row_start..row_start + w as usize * 4].fill(0);
    }
    Some(result)
}

/// Composite `source` onto `dest` at `(x, y)` using alpha-over blending
/// (source on top). Source pixels falling outside the destination are
/// clipped. Returns a new buffer sized to the destination.
pub fn paste_over(dest: &PixelBuffer, source: &PixelBuffer, x: i32, y: i32) -> PixelBuffer {
    let mut result = dest.clone();
    for sy in 0..source.height() {
        let dy = y + sy as i32;
        if dy < 0 || dy >= dest.height() as i32 {
            continue;
        }
        for sx in 0..source.width() {
            let dx = x + sx as i32;
            if dx < 0 || dx >= dest.width() as i32 {
                continue;
            }
            let src_px = source.pixel(sx, sy);
            let dst_px = result.pixel(dx as u32, dy as u32);
            result.put_pixel(dx as u32, dy as u32, blend_over(src_px, dst_px));
        }
    }
    result
}

/// Standard alpha-over: out = src + dst * (1 - src_a).
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let blend = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };
    [
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}
