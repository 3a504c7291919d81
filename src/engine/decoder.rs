// src/engine/decoder.rs
//
// Decoder operations: JPEG (mozjpeg), PNG (zune-png), BMP/TIFF (image crate).
// Every path ends in an 8-bit RGB ImageBuffer; alpha and 16-bit samples are
// normalized away here so filters only ever see one pixel format.

use crate::buffer::ImageBuffer;
use crate::engine::common::{run_guarded, CodecStage, EngineResult};
use crate::error::EditorError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use mozjpeg::Decompress;
use std::io::Cursor;
use tracing::{debug, warn};
use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

use crate::engine::{MAX_DIMENSION, MAX_PIXELS};

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo)
pub fn decode_jpeg_mozjpeg(data: &[u8]) -> EngineResult<DynamicImage> {
    run_guarded(CodecStage::Decode, "decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(EditorError::decode_failed(
                "mozjpeg: missing JPEG EOI marker",
            ));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            EditorError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            EditorError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = decompress.width();
        let height = decompress.height();
        if width > MAX_DIMENSION as usize || height > MAX_DIMENSION as usize {
            return Err(EditorError::dimension_exceeds_limit(
                width.max(height) as u32,
                MAX_DIMENSION,
            ));
        }
        let width_u32 = width as u32;
        let height_u32 = height as u32;
        check_dimensions(width_u32, height_u32)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            EditorError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;

        let flat_pixels: Vec<u8> = pixels.into_iter().flatten().collect();

        let rgb_image = RgbImage::from_raw(width_u32, height_u32, flat_pixels).ok_or_else(|| {
            EditorError::decode_failed("mozjpeg: failed to create image from raw data")
        })?;

        Ok(DynamicImage::ImageRgb8(rgb_image))
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8-bit.
pub fn decode_png_zune(data: &[u8]) -> EngineResult<DynamicImage> {
    run_guarded(CodecStage::Decode, "decode:png", || {
        let options = DecoderOptions::default()
            .png_set_strip_to_8bit(true)
            .set_max_width(MAX_DIMENSION as usize)
            .set_max_height(MAX_DIMENSION as usize);
        let mut decoder = PngDecoder::new_with_options(ZCursor::new(data), options);
        let pixels = decoder
            .decode()
            .map_err(|e| EditorError::decode_failed(format!("png: decode failed: {e}")))?;

        let info = decoder
            .info()
            .ok_or_else(|| EditorError::decode_failed("png: missing header info"))?;

        let width = info.width as u32;
        let height = info.height as u32;
        check_dimensions(width, height)?;

        let buf = match pixels {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => {
                return Err(EditorError::decode_failed(
                    "png: unexpected non-U8 pixel buffer",
                ))
            }
        };

        let colorspace = decoder
            .colorspace()
            .ok_or_else(|| EditorError::decode_failed("png: missing colorspace"))?;

        let img = match colorspace {
            ColorSpace::RGB => RgbImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| EditorError::decode_failed("png: failed to build RGB image"))?,
            ColorSpace::RGBA => RgbaImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(|| EditorError::decode_failed("png: failed to build RGBA image"))?,
            ColorSpace::Luma => GrayImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| EditorError::decode_failed("png: failed to build Luma image"))?,
            ColorSpace::LumaA => GrayAlphaImage::from_raw(width, height, buf)
                .map(DynamicImage::ImageLumaA8)
                .ok_or_else(|| EditorError::decode_failed("png: failed to build LumaA image"))?,
            other => {
                return Err(EditorError::decode_failed(format!(
                    "png: unsupported colorspace {:?}",
                    other
                )))
            }
        };

        Ok(img)
    })
}

/// Decode the remaining containers (BMP, TIFF) and act as JPEG fallback.
pub fn decode_with_image_crate(data: &[u8], format: ImageFormat) -> EngineResult<DynamicImage> {
    run_guarded(CodecStage::Decode, "decode:image", || {
        let reader = image::ImageReader::with_format(Cursor::new(data), format);
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| EditorError::decode_failed(format!("failed to read dimensions: {e}")))?;
        check_dimensions(width, height)?;

        image::load_from_memory_with_format(data, format)
            .map_err(|e| EditorError::decode_failed(format!("decode failed: {e}")))
    })
}

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Containers accepted on load.
pub fn is_supported_input(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff
    )
}

/// Unified decode entrypoint:
/// - Detect format once (magic bytes)
/// - Route JPEG to mozjpeg (image crate fallback), PNG to zune-png, the rest to image
/// - Optionally apply the EXIF Orientation tag
/// - Normalize to RGB8
pub fn decode_image(bytes: &[u8], auto_orient: bool) -> EngineResult<(ImageBuffer, ImageFormat)> {
    if bytes.is_empty() {
        return Err(EditorError::corrupted_image());
    }

    let format = detect_format(bytes).ok_or_else(|| EditorError::unsupported_format("unknown"))?;
    if !is_supported_input(format) {
        return Err(EditorError::unsupported_format(
            format!("{format:?}").to_lowercase(),
        ));
    }

    let img = match format {
        ImageFormat::Jpeg => match decode_jpeg_mozjpeg(bytes) {
            Ok(img) => img,
            Err(primary) => {
                warn!(
                    target: "mini_photoshop::codec",
                    error = %primary,
                    "mozjpeg failed, falling back to image crate"
                );
                decode_with_image_crate(bytes, ImageFormat::Jpeg).map_err(|fallback| {
                    EditorError::decode_failed(format!(
                        "{primary}; image crate fallback failed: {fallback}"
                    ))
                })?
            }
        },
        ImageFormat::Png => decode_png_zune(bytes)?,
        other => decode_with_image_crate(bytes, other)?,
    };

    let img = if auto_orient {
        match detect_exif_orientation(bytes) {
            Some(orientation) => apply_orientation(img, orientation),
            None => img,
        }
    } else {
        img
    };

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(EditorError::corrupted_image());
    }

    let buffer = ImageBuffer::from_rgb_image(img.into_rgb8())
        .map_err(|_| EditorError::corrupted_image())?;
    debug!(
        target: "mini_photoshop::codec",
        format = ?format,
        width,
        height,
        "decoded"
    );
    Ok((buffer, format))
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> EngineResult<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EditorError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(EditorError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(())
}

/// Extract EXIF Orientation tag (1-8). Returns None if missing or invalid.
pub fn detect_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let mut cursor = Cursor::new(bytes);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    let orientation = value as u16;
    if (1..=8).contains(&orientation) {
        Some(orientation)
    } else {
        None
    }
}

/// Rotate/flip so the pixels read upright for the given EXIF orientation.
pub fn apply_orientation(img: DynamicImage, orientation: u16) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(), // transpose
        6 => img.rotate90(),
        7 => img.rotate270().fliph(), // transverse
        8 => img.rotate270(),
        _ => img,
    }
}
