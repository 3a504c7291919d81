// src/engine.rs
//
// The core of mini-photoshop. Stateless building blocks that:
// 1. Decode a file into an RGB ImageBuffer and encode it back
// 2. Apply one FilterOperation to an original buffer
// 3. Fit a buffer into the preview viewport
//
// This file is a facade over the modules in engine/. State lives in session.rs.

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 300MB of RGB8.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod color;
mod common;
mod convolve;
mod decoder;
mod display;
mod edges;
mod encoder;
mod io;
mod pipeline;

pub use color::{grayscale, linear_remap, luma, round_clamp_u8, to_luma_plane};
pub use common::EngineResult;
pub use convolve::{
    auto_sigma, reflect_101, Convolver, DirectConvolver, Kernel, Kernel1D, EDGE_SMOOTHING_SIZE,
};
pub use decoder::{check_dimensions, decode_image, detect_format};
pub use display::{fit_dimensions, DisplayFrame, DisplayScaler, FirResampler, Resampler};
pub use edges::{CannyDetector, EdgeDetector, GradientNorm};
pub use encoder::{encode, encode_jpeg, encode_png};
pub use io::{read_source, resolve_output, write_atomic, Codec, FileCodec, SaveReport};
pub use pipeline::FilterEngine;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ImageBuffer;
    use crate::config::DisplayBounds;
    use crate::error::ErrorKind;
    use crate::ops::{FilterOperation, OutputFormat};

    fn scene(width: u32, height: u32) -> ImageBuffer {
        ImageBuffer::from_fn(width, height, |x, y| {
            [
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                if (x / 8 + y / 8) % 2 == 0 { 40 } else { 220 },
            ]
        })
        .unwrap()
    }

    #[test]
    fn test_filter_then_display_pipeline() {
        let original = scene(1000, 800);
        let engine = FilterEngine::new();
        let scaler = DisplayScaler::new(DisplayBounds::default());
        for op in FilterOperation::all() {
            let processed = engine.apply(Some(&original), &op).unwrap();
            let frame = scaler.fit(Some(&processed)).unwrap();
            assert_eq!(frame.dimensions(), (500, 400), "{}", op.name());
            assert_eq!(processed.dimensions(), (1000, 800));
        }
    }

    #[test]
    fn test_filtered_png_survives_encode_decode() {
        let original = scene(64, 40);
        let processed = FilterEngine::new()
            .apply(Some(&original), &FilterOperation::sharpen())
            .unwrap();
        let bytes = encode(&processed, OutputFormat::Png).unwrap();
        let (decoded, format) = decode_image(&bytes, true).unwrap();
        assert_eq!(format, image::ImageFormat::Png);
        assert_eq!(decoded, processed);
    }

    #[test]
    fn test_garbage_bytes_are_decode_errors() {
        let err = decode_image(b"definitely not an image", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        let err = decode_image(&[], true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_detect_format_by_magic() {
        let png = encode(&scene(4, 4), OutputFormat::Png).unwrap();
        assert_eq!(detect_format(&png), Some(image::ImageFormat::Png));
        let jpeg = encode(&scene(4, 4), OutputFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(detect_format(&jpeg), Some(image::ImageFormat::Jpeg));
    }
}
