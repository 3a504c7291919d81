// src/ops.rs
//
// Filter operations and output formats.
// Operations are cheap value types - the expensive work happens in FilterEngine::apply().

use crate::error::{EditorError, Result};
use std::path::Path;

/// Kernel size used by the Blur command.
pub const BLUR_KERNEL_SIZE: u32 = 9;

/// Hysteresis thresholds used by the EdgeDetect command.
pub const EDGE_LOW_THRESHOLD: f32 = 100.0;
pub const EDGE_HIGH_THRESHOLD: f32 = 200.0;

/// Gain and offset used by the BrightnessContrast command.
pub const CONTRAST_ALPHA: f32 = 1.3;
pub const BRIGHTNESS_BETA: f32 = 40.0;

/// 3x3 sharpening kernel (row-major).
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// JPEG quality used when the caller does not override it.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Extension appended to save paths that carry none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// The closed set of pixel transformations.
///
/// Each variant is self-contained: the UI commands build them through the
/// fixed constructors below and never pass their own numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOperation {
    /// Luma conversion replicated across all three channels
    Grayscale,

    /// Separable Gaussian blur; `sigma: None` derives sigma from the kernel size
    GaussianBlur { kernel_size: u32, sigma: Option<f32> },

    /// Fixed 3x3 sharpening convolution
    Sharpen,

    /// Canny-style edge map (binary, replicated to 3 channels)
    EdgeDetect { low: f32, high: f32 },

    /// `out = clamp(round(alpha * in + beta))` per channel
    BrightnessContrast { alpha: f32, beta: f32 },
}

impl FilterOperation {
    pub const fn grayscale() -> Self {
        Self::Grayscale
    }

    /// 9x9 Gaussian with automatic sigma
    pub const fn blur() -> Self {
        Self::GaussianBlur {
            kernel_size: BLUR_KERNEL_SIZE,
            sigma: None,
        }
    }

    pub const fn sharpen() -> Self {
        Self::Sharpen
    }

    /// Edge detection with low=100, high=200
    pub const fn edge_detect() -> Self {
        Self::EdgeDetect {
            low: EDGE_LOW_THRESHOLD,
            high: EDGE_HIGH_THRESHOLD,
        }
    }

    /// Linear remap with alpha=1.3, beta=40
    pub const fn brightness_contrast() -> Self {
        Self::BrightnessContrast {
            alpha: CONTRAST_ALPHA,
            beta: BRIGHTNESS_BETA,
        }
    }

    /// All five operations with their fixed parameters.
    pub const fn all() -> [Self; 5] {
        [
            Self::grayscale(),
            Self::blur(),
            Self::sharpen(),
            Self::edge_detect(),
            Self::brightness_contrast(),
        ]
    }

    /// Stable name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::GaussianBlur { .. } => "blur",
            Self::Sharpen => "sharpen",
            Self::EdgeDetect { .. } => "edge_detect",
            Self::BrightnessContrast { .. } => "brightness_contrast",
        }
    }

    /// Reject parameter combinations the algorithms cannot honour.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Grayscale | Self::Sharpen => Ok(()),
            Self::GaussianBlur { kernel_size, sigma } => {
                if kernel_size == 0 || kernel_size % 2 == 0 {
                    return Err(EditorError::invalid_parameter(
                        "kernel_size",
                        kernel_size.to_string(),
                        "must be a positive odd number",
                    ));
                }
                if let Some(s) = sigma {
                    if !s.is_finite() || s <= 0.0 {
                        return Err(EditorError::invalid_parameter(
                            "sigma",
                            s.to_string(),
                            "must be finite and positive",
                        ));
                    }
                }
                Ok(())
            }
            Self::EdgeDetect { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 {
                    return Err(EditorError::invalid_parameter(
                        "thresholds",
                        format!("{low}/{high}"),
                        "must be finite and non-negative",
                    ));
                }
                if low > high {
                    return Err(EditorError::invalid_parameter(
                        "thresholds",
                        format!("{low}/{high}"),
                        "low threshold must not exceed high threshold",
                    ));
                }
                Ok(())
            }
            Self::BrightnessContrast { alpha, beta } => {
                if !alpha.is_finite() || !beta.is_finite() {
                    return Err(EditorError::invalid_parameter(
                        "alpha/beta",
                        format!("{alpha}/{beta}"),
                        "must be finite",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Output format for encoding, negotiated from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

impl OutputFormat {
    pub fn from_extension(extension: &str, quality: Option<u8>) -> Result<Self> {
        let q = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
        match extension.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg { quality: q }),
            "png" => Ok(Self::Png),
            other => Err(EditorError::unsupported_output_format(other.to_string())),
        }
    }

    /// Negotiate from a path; a path without extension means JPEG.
    pub fn from_path(path: &Path, quality: Option<u8>) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        Self::from_extension(ext, quality)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpeg",
            Self::Png => "png",
        }
    }

    /// Lossless formats reproduce pixels exactly on round-trip.
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    #[test]
    fn fixed_constructors_carry_design_constants() {
        assert_eq!(
            FilterOperation::blur(),
            FilterOperation::GaussianBlur {
                kernel_size: 9,
                sigma: None
            }
        );
        assert_eq!(
            FilterOperation::edge_detect(),
            FilterOperation::EdgeDetect {
                low: 100.0,
                high: 200.0
            }
        );
        assert_eq!(
            FilterOperation::brightness_contrast(),
            FilterOperation::BrightnessContrast {
                alpha: 1.3,
                beta: 40.0
            }
        );
    }

    #[test]
    fn all_fixed_operations_validate() {
        for op in FilterOperation::all() {
            assert!(op.validate().is_ok(), "{} should validate", op.name());
        }
    }

    #[test]
    fn even_kernel_is_rejected() {
        let op = FilterOperation::GaussianBlur {
            kernel_size: 4,
            sigma: None,
        };
        let err = op.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let op = FilterOperation::EdgeDetect {
            low: 200.0,
            high: 100.0,
        };
        assert!(op.validate().is_err());
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let op = FilterOperation::BrightnessContrast {
            alpha: f32::NAN,
            beta: 0.0,
        };
        assert!(op.validate().is_err());
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(
            OutputFormat::from_extension("JPG", None).unwrap(),
            OutputFormat::Jpeg { quality: 95 }
        );
        assert_eq!(
            OutputFormat::from_extension("jpeg", Some(80)).unwrap(),
            OutputFormat::Jpeg { quality: 80 }
        );
        assert_eq!(
            OutputFormat::from_extension("png", None).unwrap(),
            OutputFormat::Png
        );
        let err = OutputFormat::from_extension("bmp", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }

    #[test]
    fn output_format_defaults_to_jpeg_without_extension() {
        let path = PathBuf::from("/tmp/result");
        assert_eq!(
            OutputFormat::from_path(&path, None).unwrap(),
            OutputFormat::Jpeg { quality: 95 }
        );
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(
            OutputFormat::from_extension("jpg", Some(0)).unwrap(),
            OutputFormat::Jpeg { quality: 1 }
        );
        assert_eq!(
            OutputFormat::from_extension("jpg", Some(250)).unwrap(),
            OutputFormat::Jpeg { quality: 100 }
        );
    }
}
