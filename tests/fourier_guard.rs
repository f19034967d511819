use waferview::canvas::PixelBuffer;
use waferview::components::processor::{FilterOp, ImageProcessor, ProcessError};

/// Gradient image so the spectrum has more than a DC term.
fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height, [0, 0, 0, 255]);
    for y in 0..height {
        for x in 0..width {
            buf.put_pixel(x, y, [(x * 3) as u8, (y * 5) as u8, 10, 255]);
        }
    }
    buf
}

/// Luminance the Fourier kernels operate on, rounded like the reconstruction.
fn luma(px: [u8; 4]) -> f64 {
    px[0] as f64 * 0.114 + px[1] as f64 * 0.587 + px[2] as f64 * 0.299
}

#[test]
fn inverse_before_forward_is_a_precondition_error() {
    let mut processor = ImageProcessor::new();
    let mut buf = gradient(16, 16);
    let before = buf.clone();

    let err = processor.apply(FilterOp::Ifft, &mut buf, None).unwrap_err();
    assert_eq!(err, ProcessError::NoFourierData);
    assert_eq!(err.to_string(), "no forward transform has been run");
    // Precondition failures leave the pixels untouched.
    assert_eq!(buf, before);
    assert!(!processor.has_fourier_data());
}

#[test]
fn forward_then_inverse_reconstructs_the_grayscale() {
    let mut processor = ImageProcessor::new();
    let original = gradient(16, 16);
    let mut buf = original.clone();

    processor.apply(FilterOp::Fft, &mut buf, None).unwrap();
    assert!(processor.has_fourier_data());
    // The buffer now shows the magnitude spectrum, not the image.

    processor.apply(FilterOp::Ifft, &mut buf, None).unwrap();
    assert!(!processor.has_fourier_data(), "inverse must consume the state");

    for y in 0..16 {
        for x in 0..16 {
            let expected = luma(original.pixel(x, y));
            let got = buf.pixel(x, y)[0] as f64;
            assert!(
                (got - expected).abs() <= 1.0,
                "({},{}): reconstructed {} vs luma {}",
                x,
                y,
                got,
                expected
            );
        }
    }
}

#[test]
fn second_inverse_fails_again() {
    let mut processor = ImageProcessor::new();
    let mut buf = gradient(16, 16);

    processor.apply(FilterOp::Fft, &mut buf, None).unwrap();
    processor.apply(FilterOp::Ifft, &mut buf, None).unwrap();

    let err = processor.apply(FilterOp::Ifft, &mut buf, None).unwrap_err();
    assert_eq!(err, ProcessError::NoFourierData);
}

#[test]
fn forward_overwrites_previous_state() {
    let mut processor = ImageProcessor::new();

    let mut first = gradient(16, 16);
    processor.apply(FilterOp::Fft, &mut first, None).unwrap();

    // A second forward transform replaces the stored spectrum wholesale.
    let second = PixelBuffer::new(8, 8, [50, 100, 150, 255]);
    let mut buf = second.clone();
    processor.apply(FilterOp::Fft, &mut buf, None).unwrap();
    processor.apply(FilterOp::Ifft, &mut buf, None).unwrap();

    let expected = luma([50, 100, 150, 255]);
    for y in 0..8 {
        for x in 0..8 {
            let got = buf.pixel(x, y)[0] as f64;
            assert!((got - expected).abs() <= 1.0, "({},{}): {} vs {}", x, y, got, expected);
        }
    }
}

#[test]
fn clear_is_idempotent() {
    let mut processor = ImageProcessor::new();
    processor.clear_fourier_data();
    processor.clear_fourier_data();
    assert!(!processor.has_fourier_data());

    let mut buf = gradient(16, 16);
    processor.apply(FilterOp::Fft, &mut buf, None).unwrap();
    processor.clear_fourier_data();
    assert!(!processor.has_fourier_data());
    assert!(processor.apply(FilterOp::Ifft, &mut buf, None).is_err());
}

#[test]
fn non_power_of_two_sizes_round_trip_through_padding() {
    let mut processor = ImageProcessor::new();
    let original = gradient(20, 14);
    let mut buf = original.clone();

    processor.apply(FilterOp::Fft, &mut buf, None).unwrap();
    processor.apply(FilterOp::Ifft, &mut buf, None).unwrap();

    for y in 0..14 {
        for x in 0..20 {
            let expected = luma(original.pixel(x, y));
            let got = buf.pixel(x, y)[0] as f64;
            assert!(
                (got - expected).abs() <= 1.0,
                "({},{}): reconstructed {} vs luma {}",
                x,
                y,
                got,
                expected
            );
        }
    }
}
