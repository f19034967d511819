use egui::{Pos2, Rect};
use waferview::canvas::PixelBuffer;
use waferview::ops::clipboard::{clear_region, crop, paste_over};

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
    Rect::from_min_max(Pos2::new(x0, y0), Pos2::new(x1, y1))
}

/// 10×8 buffer where each pixel encodes its coordinates: B=x, G=y.
fn coordinate_buffer() -> PixelBuffer {
    let mut buf = PixelBuffer::new(10, 8, [0, 0, 0, 255]);
    for y in 0..8 {
        for x in 0..10 {
            buf.put_pixel(x, y, [x as u8, y as u8, 7, 255]);
        }
    }
    buf
}

#[test]
fn crop_extracts_the_exact_subrect() {
    let buf = coordinate_buffer();
    let region = crop(&buf, rect(2.0, 3.0, 6.0, 7.0)).unwrap();
    assert_eq!(region.width(), 4);
    assert_eq!(region.height(), 4);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(region.pixel(x, y), [(x + 2) as u8, (y + 3) as u8, 7, 255]);
        }
    }
}

#[test]
fn crop_clamps_partial_overlap() {
    let buf = coordinate_buffer();
    // Hangs off the bottom-right corner.
    let region = crop(&buf, rect(8.0, 6.0, 20.0, 20.0)).unwrap();
    assert_eq!((region.width(), region.height()), (2, 2));
    assert_eq!(region.pixel(0, 0), [8, 6, 7, 255]);
}

#[test]
fn crop_outside_bounds_is_a_noop() {
    let buf = coordinate_buffer();
    assert!(crop(&buf, rect(50.0, 50.0, 60.0, 60.0)).is_none());
    assert!(crop(&buf, rect(-20.0, -20.0, -1.0, -1.0)).is_none());
    // Zero-size rect.
    assert!(crop(&buf, rect(3.0, 3.0, 3.0, 3.0)).is_none());
}

#[test]
fn clear_region_zeroes_all_four_channels() {
    let buf = coordinate_buffer();
    let cleared = clear_region(&buf, rect(1.0, 1.0, 4.0, 3.0)).unwrap();
    for y in 0..8u32 {
        for x in 0..10u32 {
            let px = cleared.pixel(x, y);
            if (1..4).contains(&x) && (1..3).contains(&y) {
                assert_eq!(px, [0, 0, 0, 0], "pixel ({},{}) should be cleared", x, y);
            } else {
                assert_eq!(px, buf.pixel(x, y), "pixel ({},{}) should be untouched", x, y);
            }
        }
    }
}

#[test]
fn clear_region_outside_bounds_is_a_noop() {
    let buf = coordinate_buffer();
    assert!(clear_region(&buf, rect(100.0, 0.0, 120.0, 5.0)).is_none());
}

#[test]
fn paste_copies_opaque_source_pixels() {
    let dest = PixelBuffer::new(10, 8, [9, 9, 9, 255]);
    let src = PixelBuffer::new(3, 2, [100, 150, 200, 255]);
    let out = paste_over(&dest, &src, 4, 5);
    for y in 0..8u32 {
        for x in 0..10u32 {
            let expected = if (4..7).contains(&x) && (5..7).contains(&y) {
                [100, 150, 200, 255]
            } else {
                [9, 9, 9, 255]
            };
            assert_eq!(out.pixel(x, y), expected, "pixel ({},{})", x, y);
        }
    }
}

#[test]
fn paste_clips_source_outside_destination() {
    let dest = PixelBuffer::new(6, 6, [1, 1, 1, 255]);
    let src = PixelBuffer::new(4, 4, [200, 0, 0, 255]);
    // Partially off every edge in turn.
    let out = paste_over(&dest, &src, -2, -2);
    assert_eq!(out.pixel(0, 0), [200, 0, 0, 255]);
    assert_eq!(out.pixel(2, 2), [1, 1, 1, 255]);

    let out = paste_over(&dest, &src, 4, 4);
    assert_eq!(out.pixel(5, 5), [200, 0, 0, 255]);
    assert_eq!(out.pixel(3, 3), [1, 1, 1, 255]);

    // Entirely outside: destination unchanged.
    let out = paste_over(&dest, &src, 10, 10);
    assert_eq!(out, dest);
}

#[test]
fn paste_blends_transparent_source_over_destination() {
    let dest = PixelBuffer::new(2, 1, [0, 0, 0, 255]);
    // 50%-alpha white-ish source.
    let src = PixelBuffer::new(1, 1, [255, 255, 255, 128]);
    let out = paste_over(&dest, &src, 0, 0);
    let px = out.pixel(0, 0);
    // out = src*a + dst*(1-a) over an opaque destination.
    let expected = (255.0f64 * (128.0 / 255.0)).round() as i32;
    for c in 0..3 {
        assert!(
            (px[c] as i32 - expected).abs() <= 1,
            "channel {} = {}, expected ≈{}",
            c,
            px[c],
            expected
        );
    }
    assert_eq!(px[3], 255);

    // Fully transparent source leaves the destination alone.
    let src = PixelBuffer::new(1, 1, [255, 255, 255, 0]);
    let out = paste_over(&dest, &src, 0, 0);
    assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn paste_over_cleared_region_restores_content() {
    // Cut-then-paste-back: crop a region, clear it, paste the crop back at
    // the same spot — the buffer must match the original.
    let buf = coordinate_buffer();
    let r = rect(2.0, 2.0, 7.0, 6.0);
    let region = crop(&buf, r).unwrap();
    let cleared = clear_region(&buf, r).unwrap();
    let restored = paste_over(&cleared, &region, 2, 2);
    assert_eq!(restored, buf);
}
