// ============================================================================
// SPATIAL FILTERS — rayon-parallelized pixel kernels over BGRA buffers
// ============================================================================
//
// All kernels mutate the buffer in place and share the same border policy:
// pixels closer than half a kernel to the edge are left untouched. Channel
// order is B,G,R,A throughout.
// ============================================================================

use rayon::prelude::*;

use crate::canvas::PixelBuffer;

/// In-place BT.601 grayscale. Alpha is preserved.
pub fn grayscale(buffer: &mut PixelBuffer) {
    let stride = buffer.stride();
    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                let gray =
                    (px[0] as f32 * 0.114 + px[1] as f32 * 0.587 + px[2] as f32 * 0.299) as u8;
                px[0] = gray;
                px[1] = gray;
                px[2] = gray;
            }
        });
}

/// Fixed 5×5 Gaussian blur (kernel sum 273).
pub fn gaussian_blur(buffer: &mut PixelBuffer) {
    #[rustfmt::skip]
    let mut kernel: Vec<f32> = vec![
        1.0,  4.0,  7.0,  4.0, 1.0,
        4.0, 16.0, 26.0, 16.0, 4.0,
        7.0, 26.0, 41.0, 26.0, 7.0,
        4.0, 16.0, 26.0, 16.0, 4.0,
        1.0,  4.0,  7.0,  4.0, 1.0,
    ];
    for v in &mut kernel {
        *v /= 273.0;
    }
    convolve(buffer, &kernel, 5);
}

/// Sobel edge magnitude. Converts to grayscale first, then writes
/// `sqrt(Gx² + Gy²)` clamped to 0–255 into the color channels.
pub fn sobel(buffer: &mut PixelBuffer) {
    grayscale(buffer);

    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    if width < 3 || height < 3 {
        return;
    }
    let stride = buffer.stride();
    let src = buffer.as_slice().to_vec();

    const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
    const SOBEL_Y: [[i32; 3]; 3] = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];

    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            if y < 1 || y >= height - 1 {
                return;
            }
            for x in 1..width - 1 {
                let mut gx = 0i32;
                let mut gy = 0i32;
                for i in 0..3 {
                    for j in 0..3 {
                        let v = src[(y + i - 1) * stride + (x + j - 1) * 4] as i32;
                        gx += v * SOBEL_X[i][j];
                        gy += v * SOBEL_Y[i][j];
                    }
                }
                let g = ((gx * gx + gy * gy) as f64).sqrt().clamp(0.0, 255.0) as u8;
                let pi = x * 4;
                row[pi] = g;
                row[pi + 1] = g;
                row[pi + 2] = g;
            }
        });
}

/// Laplacian edge enhancement (3×3, center weight 4) over the grayscale.
pub fn laplacian(buffer: &mut PixelBuffer) {
    grayscale(buffer);

    #[rustfmt::skip]
    let kernel: Vec<f32> = vec![
         0.0, -1.0,  0.0,
        -1.0,  4.0, -1.0,
         0.0, -1.0,  0.0,
    ];
    convolve(buffer, &kernel, 3);
}

/// Threshold binarization: grayscale, then gray > threshold → 255 else 0.
pub fn binarize(buffer: &mut PixelBuffer, threshold: i32) {
    grayscale(buffer);

    let stride = buffer.stride();
    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                let binary = if px[0] as i32 > threshold { 255 } else { 0 };
                px[0] = binary;
                px[1] = binary;
                px[2] = binary;
            }
        });
}

/// Morphological dilation: each pixel takes the window maximum.
pub fn dilate(buffer: &mut PixelBuffer, kernel_size: i32) {
    morphology(buffer, kernel_size, |window| {
        window.iter().copied().max().unwrap_or(0)
    });
}

/// Morphological erosion: each pixel takes the window minimum.
pub fn erode(buffer: &mut PixelBuffer, kernel_size: i32) {
    morphology(buffer, kernel_size, |window| {
        window.iter().copied().min().unwrap_or(255)
    });
}

/// Median filter: each pixel takes the window median. Removes salt-and-pepper
/// noise while keeping edges.
pub fn median(buffer: &mut PixelBuffer, kernel_size: i32) {
    morphology(buffer, kernel_size, |window| {
        window.sort_unstable();
        window[window.len() / 2]
    });
}

// ---------------------------------------------------------------------------
//  Shared helpers
// ---------------------------------------------------------------------------

/// Square-kernel convolution over the color channels. Alpha is forced opaque
/// inside the processed region; the border band keeps its original samples.
fn convolve(buffer: &mut PixelBuffer, kernel: &[f32], k_size: usize) {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let k_half = k_size / 2;
    if width < k_size || height < k_size {
        return;
    }
    let stride = buffer.stride();
    let src = buffer.as_slice().to_vec();

    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            if y < k_half || y >= height - k_half {
                return;
            }
            for x in k_half..width - k_half {
                let mut sum_b = 0.0f32;
                let mut sum_g = 0.0f32;
                let mut sum_r = 0.0f32;
                for ky in 0..k_size {
                    for kx in 0..k_size {
                        let si = (y + ky - k_half) * stride + (x + kx - k_half) * 4;
                        let k_val = kernel[ky * k_size + kx];
                        sum_b += src[si] as f32 * k_val;
                        sum_g += src[si + 1] as f32 * k_val;
                        sum_r += src[si + 2] as f32 * k_val;
                    }
                }
                let pi = x * 4;
                row[pi] = sum_b.clamp(0.0, 255.0) as u8;
                row[pi + 1] = sum_g.clamp(0.0, 255.0) as u8;
                row[pi + 2] = sum_r.clamp(0.0, 255.0) as u8;
                row[pi + 3] = 255;
            }
        });
}

/// Window-rank filter skeleton shared by dilate/erode/median. The reducer
/// sees the window's blue-channel samples and its result is written to all
/// three color channels, matching the native kernels these were ported from
/// (they are intended to run on grayscale or binarized images).
fn morphology<F>(buffer: &mut PixelBuffer, kernel_size: i32, reduce: F)
where
    F: Fn(&mut Vec<u8>) -> u8 + Sync,
{
    let k_size = kernel_size.max(1) as usize;
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let k_half = k_size / 2;
    if width < k_size || height < k_size {
        return;
    }
    let stride = buffer.stride();
    let src = buffer.as_slice().to_vec();

    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            if y < k_half || y >= height - k_half {
                return;
            }
            let mut window = Vec::with_capacity(k_size * k_size);
            for x in k_half..width - k_half {
                window.clear();
                for ky in 0..k_size {
                    for kx in 0..k_size {
                        window.push(src[(y + ky - k_half) * stride + (x + kx - k_half) * 4]);
                    }
                }
                let value = reduce(&mut window);
                let pi = x * 4;
                row[pi] = value;
                row[pi + 1] = value;
                row[pi + 2] = value;
            }
        });
}
