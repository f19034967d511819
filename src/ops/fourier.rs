// ============================================================================
// FOURIER TRANSFORM — forward/inverse 2-D FFT over the luminance plane
// ============================================================================
//
// The forward pass grayscales the image, zero-pads the luminance plane to
// power-of-two dimensions, runs a radix-2 FFT over rows then columns, keeps
// the complex spectrum as auxiliary state, and writes a centered
// log-magnitude visualization back into the buffer. The inverse pass
// reconstructs the grayscale image from that stored spectrum.
//
// The spectrum is only meaningful against the image that produced it; the
// gateway owns the state and enforces the forward-before-inverse protocol.
// ============================================================================

use rayon::prelude::*;
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use crate::canvas::PixelBuffer;

/// Auxiliary state produced by [`forward`] and consumed by [`inverse`]:
/// the unshifted complex spectrum plus the dimensions needed to invert it.
pub struct FourierState {
    width: u32,
    height: u32,
    padded_w: usize,
    padded_h: usize,
    spectrum: Vec<Complex>,
}

impl FourierState {
    /// Dimensions of the image the spectrum was computed from.
    pub fn source_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn memory_bytes(&self) -> usize {
        self.spectrum.len() * std::mem::size_of::<Complex>()
    }
}

/// Forward 2-D FFT. Replaces the buffer contents with the centered
/// log-magnitude spectrum and returns the state required to invert.
pub fn forward(buffer: &mut PixelBuffer) -> FourierState {
    let width = buffer.width();
    let height = buffer.height();
    let padded_w = (width as usize).next_power_of_two();
    let padded_h = (height as usize).next_power_of_two();

    // Luminance plane, zero-padded to the FFT grid.
    let mut plane = vec![Complex::ZERO; padded_w * padded_h];
    let stride = buffer.stride();
    let src = buffer.as_slice();
    for y in 0..height as usize {
        for x in 0..width as usize {
            let si = y * stride + x * 4;
            let luma = src[si] as f64 * 0.114
                + src[si + 1] as f64 * 0.587
                + src[si + 2] as f64 * 0.299;
            plane[y * padded_w + x] = Complex { re: luma, im: 0.0 };
        }
    }

    fft_2d(&mut plane, padded_w, padded_h, false);

    write_spectrum_view(buffer, &plane, padded_w, padded_h);

    FourierState {
        width,
        height,
        padded_w,
        padded_h,
        spectrum: plane,
    }
}

/// Inverse 2-D FFT of a stored spectrum. Writes the reconstructed grayscale
/// image into the buffer (which must match the forward transform's size —
/// the gateway guarantees this by clearing stale state).
pub fn inverse(state: &FourierState, buffer: &mut PixelBuffer) {
    let mut plane = state.spectrum.clone();
    fft_2d(&mut plane, state.padded_w, state.padded_h, true);

    let width = state.width.min(buffer.width()) as usize;
    let height = state.height.min(buffer.height()) as usize;
    let stride = buffer.stride();
    let padded_w = state.padded_w;
    let dst = buffer.as_mut_slice();
    for y in 0..height {
        for x in 0..width {
            let value = plane[y * padded_w + x].re.round().clamp(0.0, 255.0) as u8;
            let di = y * stride + x * 4;
            dst[di] = value;
            dst[di + 1] = value;
            dst[di + 2] = value;
            dst[di + 3] = 255;
        }
    }
}

/// Render the centered log-magnitude spectrum into the buffer for display.
fn write_spectrum_view(buffer: &mut PixelBuffer, plane: &[Complex], padded_w: usize, padded_h: usize) {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;

    // log(1 + |F|) compresses the dynamic range enough to see structure.
    let max_mag = plane
        .iter()
        .map(|c| (1.0 + c.magnitude()).ln())
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    let stride = buffer.stride();
    buffer
        .as_mut_slice()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            if y >= height {
                return;
            }
            // Nearest sampling from the padded grid, with the zero frequency
            // shifted to the center.
            let sy = (y * padded_h / height + padded_h / 2) % padded_h;
            for x in 0..width {
                let sx = (x * padded_w / width + padded_w / 2) % padded_w;
                let mag = (1.0 + plane[sy * padded_w + sx].magnitude()).ln();
                let value = (mag / max_mag * 255.0).clamp(0.0, 255.0) as u8;
                let pi = x * 4;
                row[pi] = value;
                row[pi + 1] = value;
                row[pi + 2] = value;
                row[pi + 3] = 255;
            }
        });
}

// ---------------------------------------------------------------------------
//  FFT internals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    fn from_angle(angle: f64) -> Self {
        Complex {
            re: angle.cos(),
            im: angle.sin(),
        }
    }

    fn magnitude(&self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl Mul<f64> for Complex {
    type Output = Complex;
    fn mul(self, rhs: f64) -> Complex {
        Complex {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

/// Iterative in-place radix-2 Cooley–Tukey. `data.len()` must be a power of
/// two; the inverse direction folds in the 1/n scale.
fn fft_1d(data: &mut [Complex], invert: bool) {
    let n = data.len();
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    let mut len = 2usize;
    while len <= n {
        let angle = 2.0 * PI / len as f64 * if invert { 1.0 } else { -1.0 };
        let w_len = Complex::from_angle(angle);
        for base in (0..n).step_by(len) {
            let mut w = Complex { re: 1.0, im: 0.0 };
            for k in 0..len / 2 {
                let u = data[base + k];
                let v = data[base + k + len / 2] * w;
                data[base + k] = u + v;
                data[base + k + len / 2] = u - v;
                w = w * w_len;
            }
        }
        len <<= 1;
    }

    if invert {
        let scale = 1.0 / n as f64;
        for value in data.iter_mut() {
            *value = *value * scale;
        }
    }
}

/// 2-D FFT: rows in parallel, then columns (via transpose) in parallel.
fn fft_2d(plane: &mut [Complex], width: usize, height: usize, invert: bool) {
    plane
        .par_chunks_mut(width)
        .for_each(|row| fft_1d(row, invert));

    let mut transposed = vec![Complex::ZERO; width * height];
    for y in 0..height {
        for x in 0..width {
            transposed[x * height + y] = plane[y * width + x];
        }
    }
    transposed
        .par_chunks_mut(height)
        .for_each(|col| fft_1d(col, invert));

    for x in 0..width {
        for y in 0..height {
            plane[y * width + x] = transposed[x * height + y];
        }
    }
}
