// src/engine/encoder.rs
//
// Encoder operations: JPEG (mozjpeg) and PNG (image crate + oxipng).

use crate::buffer::{ImageBuffer, CHANNELS};
use crate::engine::common::{run_guarded, CodecStage, EngineResult};
use crate::error::EditorError;
use crate::ops::OutputFormat;
use image::ImageFormat;
use mozjpeg::{ColorSpace, Compress};
use std::io::Cursor;
use tracing::debug;

use crate::engine::MAX_DIMENSION;

/// Encode a buffer into the container selected by `format`.
pub fn encode(buffer: &ImageBuffer, format: OutputFormat) -> EngineResult<Vec<u8>> {
    let encoded = match format {
        OutputFormat::Jpeg { quality } => encode_jpeg(buffer, quality)?,
        OutputFormat::Png => encode_png(buffer)?,
    };
    debug!(
        target: "mini_photoshop::codec",
        format = format.name(),
        width = buffer.width(),
        height = buffer.height(),
        bytes = encoded.len(),
        "encoded"
    );
    Ok(encoded)
}

fn validate_for_encode(buffer: &ImageBuffer, format: &'static str) -> EngineResult<()> {
    let (w, h) = buffer.dimensions();
    if w == 0 || h == 0 || buffer.as_raw().is_empty() {
        return Err(EditorError::empty_buffer());
    }
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(EditorError::encode_failed(
            format,
            format!("dimensions {w}x{h} exceed max {MAX_DIMENSION}"),
        ));
    }
    let expected_len = (w as usize) * (h as usize) * CHANNELS;
    if buffer.as_raw().len() != expected_len {
        return Err(EditorError::invalid_buffer(
            w,
            h,
            buffer.as_raw().len(),
            expected_len,
        ));
    }
    Ok(())
}

/// Encode to JPEG using mozjpeg.
///
/// 4:2:0 chroma subsampling with optimized Huffman tables; `quality` is 1-100.
pub fn encode_jpeg(buffer: &ImageBuffer, quality: u8) -> EngineResult<Vec<u8>> {
    validate_for_encode(buffer, "jpeg")?;
    run_guarded(CodecStage::Encode, "jpeg", || {
        let quality = quality.clamp(1, 100);
        let (w, h) = buffer.dimensions();
        let pixels = buffer.as_raw();

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(w as usize, h as usize);
        comp.set_color_space(ColorSpace::JCS_YCbCr);
        comp.set_quality(quality as f32);
        comp.set_chroma_sampling_pixel_sizes((2, 2), (2, 2));
        comp.set_optimize_coding(true);

        let estimated_size = (w as usize * h as usize * 3 / 10).max(4096);
        let mut output = Vec::with_capacity(estimated_size);

        let encoded = {
            let mut writer = comp.start_compress(&mut output).map_err(|e| {
                EditorError::encode_failed(
                    "jpeg",
                    format!("mozjpeg: failed to start compress: {e:?}"),
                )
            })?;

            let stride = w as usize * CHANNELS;
            for row in pixels.chunks(stride) {
                writer.write_scanlines(row).map_err(|e| {
                    EditorError::encode_failed(
                        "jpeg",
                        format!("mozjpeg: failed to write scanlines: {e:?}"),
                    )
                })?;
            }

            writer.finish().map_err(|e| {
                EditorError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
            })?;

            output
        };

        Ok(encoded)
    })
}

/// Encode to PNG using the image crate, then recompress losslessly with oxipng.
pub fn encode_png(buffer: &ImageBuffer) -> EngineResult<Vec<u8>> {
    validate_for_encode(buffer, "png")?;
    run_guarded(CodecStage::Encode, "png", || {
        let rgb = buffer.to_rgb_image()?;
        let mut buf = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| EditorError::encode_failed("png", format!("PNG encode failed: {e}")))?;

        let mut options = oxipng::Options::from_preset(2);
        options.strip = oxipng::StripChunks::None;

        oxipng::optimize_from_memory(&buf, &options).map_err(|e| {
            EditorError::encode_failed("png", format!("oxipng optimization failed: {e}"))
        })
    })
}
