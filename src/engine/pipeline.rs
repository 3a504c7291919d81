// src/engine/pipeline.rs
//
// Pipeline operations: dispatch a FilterOperation to the color, convolution
// and edge stages. Every call starts from the buffer it is given; results are
// never fed back into the next call.

use crate::buffer::ImageBuffer;
use crate::engine::color;
use crate::engine::common::EngineResult;
use crate::engine::convolve::{Convolver, DirectConvolver, Kernel, Kernel1D};
use crate::engine::edges::{CannyDetector, EdgeDetector};
use crate::error::EditorError;
use crate::ops::FilterOperation;
use std::time::Instant;
use tracing::debug;

/// Applies one filter to an original buffer.
///
/// The convolution backend and the edge detector are type parameters so
/// alternative implementations can be swapped in without touching dispatch.
#[derive(Clone, Debug, Default)]
pub struct FilterEngine<C: Convolver = DirectConvolver, E: EdgeDetector = CannyDetector> {
    convolver: C,
    detector: E,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Convolver, E: EdgeDetector> FilterEngine<C, E> {
    pub fn with_parts(convolver: C, detector: E) -> Self {
        Self {
            convolver,
            detector,
        }
    }

    /// Apply `op` to `original` and return a new buffer of the same size.
    ///
    /// `None` means nothing is loaded and yields `NoImageLoaded`. The input is
    /// never mutated.
    pub fn apply(
        &self,
        original: Option<&ImageBuffer>,
        op: &FilterOperation,
    ) -> EngineResult<ImageBuffer> {
        let source = original.ok_or_else(EditorError::no_image_loaded)?;
        op.validate()?;

        let start = Instant::now();
        let output = match *op {
            FilterOperation::Grayscale => color::grayscale(source)?,
            FilterOperation::GaussianBlur { kernel_size, sigma } => {
                let kernel = Kernel1D::gaussian(kernel_size, sigma)?;
                self.convolver.convolve_separable(source, &kernel)?
            }
            FilterOperation::Sharpen => self.convolver.convolve(source, Kernel::sharpen())?,
            FilterOperation::EdgeDetect { low, high } => {
                let luma = color::to_luma_plane(source)?;
                let smoothed = self
                    .convolver
                    .smooth_plane(&luma, Kernel1D::edge_smoothing())?;
                let edges = self.detector.detect(&smoothed, low, high)?;
                ImageBuffer::from_luma(&edges)?
            }
            FilterOperation::BrightnessContrast { alpha, beta } => {
                color::linear_remap(source, alpha, beta)?
            }
        };

        if output.dimensions() != source.dimensions() {
            return Err(EditorError::conversion_failed(
                op.name(),
                format!(
                    "output {:?} does not match input {:?}",
                    output.dimensions(),
                    source.dimensions()
                ),
            ));
        }

        debug!(
            target: "mini_photoshop::filter",
            op = op.name(),
            width = source.width(),
            height = source.height(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "filter applied"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LumaPlane;
    use crate::engine::edges::GradientNorm;
    use crate::error::ErrorKind;

    fn reference() -> ImageBuffer {
        ImageBuffer::from_pixel(4, 4, [100, 150, 200]).unwrap()
    }

    #[test]
    fn no_image_is_reported() {
        for op in FilterOperation::all() {
            let err = FilterEngine::new().apply(None, &op).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoImageLoaded, "{}", op.name());
        }
    }

    #[test]
    fn every_filter_preserves_dimensions() {
        let img = ImageBuffer::from_fn(13, 7, |x, y| [(x * 19) as u8, (y * 31) as u8, 60]).unwrap();
        let engine = FilterEngine::new();
        for op in FilterOperation::all() {
            let out = engine.apply(Some(&img), &op).unwrap();
            assert_eq!(out.dimensions(), (13, 7), "{}", op.name());
            assert_eq!(out.as_raw().len(), 13 * 7 * 3);
        }
    }

    #[test]
    fn reference_grayscale() {
        let out = FilterEngine::new()
            .apply(Some(&reference()), &FilterOperation::grayscale())
            .unwrap();
        assert!(out.pixels().all(|p| p == [141, 141, 141]));
    }

    #[test]
    fn reference_brightness_contrast() {
        let out = FilterEngine::new()
            .apply(Some(&reference()), &FilterOperation::brightness_contrast())
            .unwrap();
        assert!(out.pixels().all(|p| p == [170, 235, 255]));
    }

    #[test]
    fn uniform_image_is_fixed_under_blur_and_sharpen() {
        let engine = FilterEngine::new();
        let img = reference();
        assert_eq!(engine.apply(Some(&img), &FilterOperation::blur()).unwrap(), img);
        assert_eq!(engine.apply(Some(&img), &FilterOperation::sharpen()).unwrap(), img);
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let out = FilterEngine::new()
            .apply(Some(&reference()), &FilterOperation::edge_detect())
            .unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn step_image_produces_binary_edges() {
        let img = ImageBuffer::from_fn(16, 8, |x, _| if x < 8 { [0; 3] } else { [255; 3] }).unwrap();
        let out = FilterEngine::new()
            .apply(Some(&img), &FilterOperation::edge_detect())
            .unwrap();
        assert!(out.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
        assert!(out.as_raw().iter().all(|&v| v == 0 || v == 255));
        for y in 0..8 {
            let hits: Vec<u32> = (0..16)
                .filter(|&x| out.pixel(x, y) == Some([255, 255, 255]))
                .collect();
            assert!(!hits.is_empty(), "row {y} has no edge");
            assert!(hits.iter().all(|x| (6..=9).contains(x)), "row {y}: {hits:?}");
        }
    }

    #[test]
    fn original_is_untouched() {
        let img = ImageBuffer::from_fn(5, 5, |x, y| [(x * 50) as u8, (y * 50) as u8, 9]).unwrap();
        let snapshot = img.clone();
        let engine = FilterEngine::new();
        for op in FilterOperation::all() {
            engine.apply(Some(&img), &op).unwrap();
        }
        assert_eq!(img, snapshot);
    }

    #[test]
    fn invalid_parameters_are_conversion_errors() {
        let op = FilterOperation::GaussianBlur {
            kernel_size: 8,
            sigma: None,
        };
        let err = FilterEngine::new().apply(Some(&reference()), &op).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    struct ShrinkingDetector;

    impl EdgeDetector for ShrinkingDetector {
        fn detect(&self, _plane: &LumaPlane, _low: f32, _high: f32) -> EngineResult<LumaPlane> {
            LumaPlane::from_raw(1, 1, vec![0])
        }
    }

    #[test]
    fn mismatched_output_is_a_conversion_error() {
        let engine = FilterEngine::with_parts(DirectConvolver, ShrinkingDetector);
        let err = engine
            .apply(Some(&reference()), &FilterOperation::edge_detect())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[test]
    fn detector_norm_is_pluggable() {
        let engine = FilterEngine::with_parts(DirectConvolver, CannyDetector::new(GradientNorm::L2));
        let out = engine
            .apply(Some(&reference()), &FilterOperation::edge_detect())
            .unwrap();
        assert_eq!(out.dimensions(), (4, 4));
    }
}
