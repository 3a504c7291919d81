// src/engine/display.rs
//
// Preview scaling: fit a buffer inside the viewport, keeping aspect ratio.
// Never upscales. Resampling is Lanczos3 (fast_image_resize), with the image
// crate as fallback.

use crate::buffer::ImageBuffer;
use crate::config::DisplayBounds;
use crate::engine::common::EngineResult;
use crate::error::EditorError;
use fast_image_resize::{self as fir, PixelType, ResizeOptions};
use image::imageops::FilterType;
use tracing::{debug, warn};

/// What the UI actually shows. Derived data: never written back to a slot.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayFrame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB8, row-major
    pub pixels: Vec<u8>,
    /// Display size / source size (1.0 when shown at native size)
    pub scale: f64,
}

impl DisplayFrame {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Target size for a `width x height` image inside `max_width x max_height`.
///
/// Returns `(w, h, scale)`. The limiting axis lands exactly on its bound, the
/// other is floored and kept at least 1. Images already inside the bounds are
/// returned unchanged with scale 1.0.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32, f64) {
    if width <= max_width && height <= max_height {
        return (width, height, 1.0);
    }
    let (w, h) = (width as u64, height as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);

    // Compare mw/w against mh/h without division.
    if mw * h <= mh * w {
        let new_h = (h * mw / w).max(1) as u32;
        (max_width, new_h, max_width as f64 / width as f64)
    } else {
        let new_w = (w * mh / h).max(1) as u32;
        (new_w, max_height, max_height as f64 / height as f64)
    }
}

/// Resampling backend.
pub trait Resampler {
    fn resample(&self, src: &ImageBuffer, width: u32, height: u32) -> EngineResult<ImageBuffer>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FirResampler;

fn lanczos_options() -> ResizeOptions {
    ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
}

fn resize_with_fir(src: &ImageBuffer, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let src_image = fir::images::Image::from_vec_u8(
        src.width(),
        src.height(),
        src.as_raw().to_vec(),
        PixelType::U8x3,
    )
    .map_err(|e| format!("fir source image error: {e:?}"))?;
    let mut dst_image = fir::images::Image::new(width, height, PixelType::U8x3);

    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &lanczos_options())
        .map_err(|e| format!("fir resize error: {e:?}"))?;
    Ok(dst_image.into_vec())
}

fn resize_with_image_crate(src: &ImageBuffer, width: u32, height: u32) -> EngineResult<Vec<u8>> {
    let rgb = src.to_rgb_image()?;
    Ok(image::imageops::resize(&rgb, width, height, FilterType::Lanczos3).into_raw())
}

impl Resampler for FirResampler {
    fn resample(&self, src: &ImageBuffer, width: u32, height: u32) -> EngineResult<ImageBuffer> {
        if width == 0 || height == 0 {
            return Err(EditorError::resize_failed(
                src.dimensions(),
                (width, height),
                "invalid dimensions for resize",
            ));
        }
        let pixels = match resize_with_fir(src, width, height) {
            Ok(pixels) => pixels,
            Err(reason) => {
                warn!(
                    target: "mini_photoshop::display",
                    %reason,
                    "fast resize failed, using image crate"
                );
                resize_with_image_crate(src, width, height)?
            }
        };
        ImageBuffer::from_raw(width, height, pixels).map_err(|e| {
            EditorError::resize_failed(src.dimensions(), (width, height), e.to_string())
        })
    }
}

/// Produces display frames bounded by the configured viewport.
#[derive(Clone, Debug)]
pub struct DisplayScaler<R: Resampler = FirResampler> {
    bounds: DisplayBounds,
    resampler: R,
}

impl Default for DisplayScaler {
    fn default() -> Self {
        Self::new(DisplayBounds::default())
    }
}

impl DisplayScaler {
    pub fn new(bounds: DisplayBounds) -> Self {
        Self::with_resampler(bounds, FirResampler)
    }
}

impl<R: Resampler> DisplayScaler<R> {
    pub fn with_resampler(bounds: DisplayBounds, resampler: R) -> Self {
        Self { bounds, resampler }
    }

    pub fn bounds(&self) -> DisplayBounds {
        self.bounds
    }

    /// Scale `image` to fit the viewport. The input is not modified.
    pub fn fit(&self, image: Option<&ImageBuffer>) -> EngineResult<DisplayFrame> {
        let image = image.ok_or_else(|| EditorError::display_failed("no image to display"))?;
        let DisplayBounds {
            max_width,
            max_height,
        } = self.bounds;
        if max_width == 0 || max_height == 0 {
            return Err(EditorError::display_failed(format!(
                "viewport {max_width}x{max_height} has zero area"
            )));
        }

        let (src_w, src_h) = image.dimensions();
        let (width, height, scale) = fit_dimensions(src_w, src_h, max_width, max_height);
        let pixels = if (width, height) == (src_w, src_h) {
            image.as_raw().to_vec()
        } else {
            self.resampler.resample(image, width, height)?.into_raw()
        };

        debug!(
            target: "mini_photoshop::display",
            src_width = src_w,
            src_height = src_h,
            width,
            height,
            scale,
            "display frame"
        );
        Ok(DisplayFrame {
            width,
            height,
            pixels,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fit_dimensions_reference_cases() {
        assert_eq!(fit_dimensions(1000, 800, 500, 400), (500, 400, 0.5));
        assert_eq!(fit_dimensions(2000, 500, 500, 400), (500, 125, 0.25));
        assert_eq!(fit_dimensions(300, 200, 500, 400), (300, 200, 1.0));
        assert_eq!(fit_dimensions(500, 400, 500, 400), (500, 400, 1.0));
    }

    #[test]
    fn fit_dimensions_height_limited() {
        let (w, h, scale) = fit_dimensions(400, 1600, 500, 400);
        assert_eq!((w, h), (100, 400));
        assert!((scale - 0.25).abs() < 1e-12);
    }

    #[test]
    fn fit_dimensions_floors_and_keeps_one_pixel() {
        assert_eq!(fit_dimensions(3000, 1001, 500, 400).0, 500);
        assert_eq!(fit_dimensions(3000, 1001, 500, 400).1, 166);
        let (w, h, _) = fit_dimensions(100_000, 1, 500, 400);
        assert_eq!((w, h), (500, 1));
    }

    #[test]
    fn scaler_keeps_its_bounds() {
        assert_eq!(DisplayScaler::default().bounds(), DisplayBounds::default());
        let bounds = DisplayBounds::new(64, 48);
        assert_eq!(DisplayScaler::new(bounds).bounds(), bounds);
    }

    #[test]
    fn fit_requires_an_image() {
        let err = DisplayScaler::default().fit(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Display);
    }

    #[test]
    fn zero_viewport_is_a_display_error() {
        let img = ImageBuffer::from_pixel(4, 4, [1, 2, 3]).unwrap();
        let err = DisplayScaler::new(DisplayBounds::new(0, 400))
            .fit(Some(&img))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Display);
    }

    #[test]
    fn small_image_is_shown_at_native_size() {
        let img = ImageBuffer::from_fn(30, 20, |x, y| [x as u8, y as u8, 1]).unwrap();
        let frame = DisplayScaler::default().fit(Some(&img)).unwrap();
        assert_eq!(frame.dimensions(), (30, 20));
        assert_eq!(frame.scale, 1.0);
        assert_eq!(frame.pixels, img.as_raw());
    }

    #[test]
    fn large_image_is_downscaled() {
        let img = ImageBuffer::from_pixel(1000, 800, [10, 200, 90]).unwrap();
        let frame = DisplayScaler::default().fit(Some(&img)).unwrap();
        assert_eq!(frame.dimensions(), (500, 400));
        assert_eq!(frame.pixels.len(), 500 * 400 * 3);
        // Lanczos on a flat field stays (almost) flat.
        assert!(frame
            .pixels
            .chunks_exact(3)
            .all(|p| p[0].abs_diff(10) <= 1 && p[1].abs_diff(200) <= 1 && p[2].abs_diff(90) <= 1));
        assert_eq!(img.dimensions(), (1000, 800));
    }

    #[test]
    fn image_crate_fallback_matches_size() {
        let img = ImageBuffer::from_pixel(40, 10, [50, 50, 50]).unwrap();
        let pixels = resize_with_image_crate(&img, 20, 5).unwrap();
        assert_eq!(pixels.len(), 20 * 5 * 3);
    }

    struct FixedResampler;

    impl Resampler for FixedResampler {
        fn resample(&self, _src: &ImageBuffer, width: u32, height: u32) -> EngineResult<ImageBuffer> {
            ImageBuffer::from_pixel(width, height, [7, 7, 7])
        }
    }

    #[test]
    fn resampler_is_pluggable() {
        let img = ImageBuffer::from_pixel(20, 20, [0, 0, 0]).unwrap();
        let scaler = DisplayScaler::with_resampler(DisplayBounds::new(10, 10), FixedResampler);
        let frame = scaler.fit(Some(&img)).unwrap();
        assert_eq!(frame.dimensions(), (10, 10));
        assert!(frame.pixels.iter().all(|&v| v == 7));
    }
}
