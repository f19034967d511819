// ============================================================================
// IMAGE PROCESSOR — named-operation gateway with the Fourier two-phase guard
// ============================================================================

use crate::canvas::PixelBuffer;
use crate::ops::{filters, fourier};
use crate::ops::fourier::FourierState;

/// Every named pixel operation the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Grayscale,
    GaussianBlur,
    Sobel,
    Laplacian,
    Binarize,
    Dilate,
    Erode,
    Median,
    Fft,
    Ifft,
}

impl FilterOp {
    /// Human-readable name, used for menus, history entries, and the log.
    pub fn label(&self) -> &'static str {
        match self {
            FilterOp::Grayscale => "Grayscale",
            FilterOp::GaussianBlur => "Gaussian Blur",
            FilterOp::Sobel => "Sobel Edge",
            FilterOp::Laplacian => "Laplacian Edge",
            FilterOp::Binarize => "Binarization",
            FilterOp::Dilate => "Dilation",
            FilterOp::Erode => "Erosion",
            FilterOp::Median => "Median Filter",
            FilterOp::Fft => "Fourier Transform",
            FilterOp::Ifft => "Inverse Fourier Transform",
        }
    }

    /// The integer parameter this operation takes, if any.
    pub fn parameter(&self) -> Option<ParamSpec> {
        match self {
            FilterOp::Binarize => Some(ParamSpec {
                prompt: "Threshold (0-255)",
                default: 128,
            }),
            FilterOp::Dilate | FilterOp::Erode | FilterOp::Median => Some(ParamSpec {
                prompt: "Kernel size (odd, 1-31)",
                default: 3,
            }),
            _ => None,
        }
    }

    pub fn takes_parameter(&self) -> bool {
        self.parameter().is_some()
    }
}

/// Prompt text and default value for a parameterized operation.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub prompt: &'static str,
    pub default: i32,
}

/// Error type for gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Inverse transform requested with no stored forward-transform data.
    NoFourierData,
    /// Parameter rejected before any pixel was touched.
    InvalidParameter(String),
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::NoFourierData => {
                write!(f, "no forward transform has been run")
            }
            ProcessError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
        }
    }
}

/// Synchronous gateway to the pixel kernels.
///
/// Stateless for the spatial filters; the Fourier pair carries cross-call
/// state: `Fft` stores the spectrum here, `Ifft` requires and then consumes
/// it. The state machine is two states (`NoAux`/`AuxPresent`) and `Ifft`
/// from `NoAux` is its single error transition. One instance per session —
/// the stored spectrum is never shared.
pub struct ImageProcessor {
    fourier: Option<FourierState>,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor {
    pub fn new() -> Self {
        Self { fourier: None }
    }

    /// Apply a named operation to the buffer in place. Parameterized
    /// operations fall back to their documented default when `param` is
    /// `None`. On error the buffer is untouched.
    pub fn apply(
        &mut self,
        op: FilterOp,
        buffer: &mut PixelBuffer,
        param: Option<i32>,
    ) -> Result<(), ProcessError> {
        match op {
            FilterOp::Grayscale => filters::grayscale(buffer),
            FilterOp::GaussianBlur => filters::gaussian_blur(buffer),
            FilterOp::Sobel => filters::sobel(buffer),
            FilterOp::Laplacian => filters::laplacian(buffer),
            FilterOp::Binarize => {
                let threshold = self.validated_param(op, param)?;
                filters::binarize(buffer, threshold);
            }
            FilterOp::Dilate => {
                let size = self.validated_param(op, param)?;
                filters::dilate(buffer, size);
            }
            FilterOp::Erode => {
                let size = self.validated_param(op, param)?;
                filters::erode(buffer, size);
            }
            FilterOp::Median => {
                let size = self.validated_param(op, param)?;
                filters::median(buffer, size);
            }
            FilterOp::Fft => {
                // A new forward transform overwrites any previous spectrum:
                // at most one image's worth of auxiliary state exists.
                self.fourier = Some(fourier::forward(buffer));
            }
            FilterOp::Ifft => {
                let state = self.fourier.as_ref().ok_or(ProcessError::NoFourierData)?;
                fourier::inverse(state, buffer);
                self.fourier = None;
            }
        }
        Ok(())
    }

    /// Range-check a parameter (or substitute the default) without touching
    /// any pixels.
    fn validated_param(&self, op: FilterOp, param: Option<i32>) -> Result<i32, ProcessError> {
        let spec = op
            .parameter()
            .ok_or_else(|| ProcessError::InvalidParameter("operation takes no parameter".into()))?;
        let value = param.unwrap_or(spec.default);
        match op {
            FilterOp::Binarize => {
                if !(0..=255).contains(&value) {
                    return Err(ProcessError::InvalidParameter(format!(
                        "threshold must be 0-255, got {}",
                        value
                    )));
                }
            }
            FilterOp::Dilate | FilterOp::Erode | FilterOp::Median => {
                if value < 1 || value > 31 || value % 2 == 0 {
                    return Err(ProcessError::InvalidParameter(format!(
                        "kernel size must be odd and within 1-31, got {}",
                        value
                    )));
                }
            }
            _ => {}
        }
        Ok(value)
    }

    /// Whether a forward transform's spectrum is currently stored.
    pub fn has_fourier_data(&self) -> bool {
        self.fourier.is_some()
    }

    /// Explicitly drop the stored spectrum. Idempotent.
    pub fn clear_fourier_data(&mut self) {
        self.fourier = None;
    }
}
