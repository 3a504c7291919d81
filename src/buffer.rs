// src/buffer.rs
//
// Pixel containers exchanged between the codec, the filters and the display
// scaler. `ImageBuffer` is always 8-bit RGB, tightly packed, row-major.

use crate::error::{EditorError, Result};
use image::RgbImage;

/// Channels per pixel. Fixed: every buffer is RGB.
pub const CHANNELS: usize = 3;

/// Byte length of a `width x height` RGB buffer, `None` on overflow.
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// In-memory RGB8 image.
///
/// Invariants: `width >= 1`, `height >= 1`, `data.len() == width * height * 3`.
/// Fields are private so the invariants cannot be broken after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.data.len())
            .finish()
    }
}

impl ImageBuffer {
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = expected_len(width, height)
            .ok_or_else(|| EditorError::invalid_buffer(width, height, data.len(), usize::MAX))?;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(EditorError::invalid_buffer(
                width,
                height,
                data.len(),
                expected,
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Uniform image filled with one RGB value.
    pub fn from_pixel(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let len = expected_len(width, height)
            .ok_or_else(|| EditorError::invalid_buffer(width, height, 0, usize::MAX))?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / CHANNELS {
            data.extend_from_slice(&rgb);
        }
        Self::from_raw(width, height, data)
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Result<Self> {
        let len = expected_len(width, height)
            .ok_or_else(|| EditorError::invalid_buffer(width, height, 0, usize::MAX))?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_raw(width, height, data)
    }

    /// Replicate a single-channel plane into all three channels.
    pub fn from_luma(plane: &LumaPlane) -> Result<Self> {
        let mut data = Vec::with_capacity(plane.data.len() * CHANNELS);
        for &v in &plane.data {
            data.extend_from_slice(&[v, v, v]);
        }
        Self::from_raw(plane.width, plane.height, data)
    }

    pub fn from_rgb_image(img: RgbImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }

    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            EditorError::conversion_failed("to_rgb_image", "buffer does not match dimensions")
        })
    }

    pub fn into_rgb_image(self) -> Result<RgbImage> {
        let (width, height, len) = (self.width, self.height, self.data.len());
        RgbImage::from_raw(width, height, self.data).ok_or_else(|| {
            EditorError::conversion_failed(
                "into_rgb_image",
                format!("{width}x{height} does not match {len} bytes"),
            )
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn channels(&self) -> usize {
        CHANNELS
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGB value at `(x, y)`; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Iterate pixels as `[r, g, b]` slices in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(CHANNELS)
    }
}

/// Single-channel 8-bit plane used by luma-based steps (edge detection).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumaPlane {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaPlane {
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| EditorError::invalid_buffer(width, height, data.len(), usize::MAX))?;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(EditorError::invalid_buffer(
                width,
                height,
                data.len(),
                expected,
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_length_mismatch() {
        let err = ImageBuffer::from_raw(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidBuffer {
                len: 11,
                expected: 12,
                ..
            }
        ));
    }

    #[test]
    fn from_raw_rejects_zero_dimensions() {
        assert!(ImageBuffer::from_raw(0, 4, Vec::new()).is_err());
        assert!(ImageBuffer::from_raw(4, 0, Vec::new()).is_err());
    }

    #[test]
    fn from_pixel_fills_every_pixel() {
        let buf = ImageBuffer::from_pixel(3, 2, [1, 2, 3]).unwrap();
        assert_eq!(buf.as_raw().len(), 18);
        assert!(buf.pixels().all(|p| p == [1, 2, 3]));
    }

    #[test]
    fn from_fn_is_row_major() {
        let buf = ImageBuffer::from_fn(2, 2, |x, y| [x as u8, y as u8, 0]).unwrap();
        assert_eq!(buf.pixel(1, 0), Some([1, 0, 0]));
        assert_eq!(buf.pixel(0, 1), Some([0, 1, 0]));
        assert_eq!(buf.pixel(2, 0), None);
    }

    #[test]
    fn from_luma_replicates_channels() {
        let plane = LumaPlane::from_raw(2, 1, vec![7, 200]).unwrap();
        let buf = ImageBuffer::from_luma(&plane).unwrap();
        assert_eq!(buf.as_raw(), &[7, 7, 7, 200, 200, 200]);
    }

    #[test]
    fn rgb_image_round_trip_keeps_pixels() {
        let buf = ImageBuffer::from_fn(4, 3, |x, y| [x as u8 * 10, y as u8 * 20, 5]).unwrap();
        let img = buf.to_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        let back = ImageBuffer::from_rgb_image(img).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn into_rgb_image_moves_data() {
        let buf = ImageBuffer::from_pixel(3, 2, [9, 8, 7]).unwrap();
        let img = buf.into_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [9, 8, 7]);
    }

    #[test]
    fn luma_plane_get_is_bounds_checked() {
        let plane = LumaPlane::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(plane.get(1, 0), Some(2));
        assert_eq!(plane.get(0, 1), Some(3));
        assert_eq!(plane.get(2, 0), None);
        assert_eq!(plane.get(0, 2), None);
    }
}
