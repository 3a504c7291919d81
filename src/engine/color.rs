// src/engine/color.rs
//
// Per-pixel color math: luma extraction and the linear gain/offset remap.

use crate::buffer::{ImageBuffer, LumaPlane};
use crate::engine::common::EngineResult;

/// ITU-R BT.601 luma weights.
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// Round half away from zero, then saturate into a byte. NaN maps to 0.
#[inline]
pub fn round_clamp_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    round_clamp_u8(LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32)
}

pub fn to_luma_plane(image: &ImageBuffer) -> EngineResult<LumaPlane> {
    let data = image.pixels().map(|p| luma(p[0], p[1], p[2])).collect();
    LumaPlane::from_raw(image.width(), image.height(), data)
}

/// Luma replicated into R, G and B.
pub fn grayscale(image: &ImageBuffer) -> EngineResult<ImageBuffer> {
    ImageBuffer::from_luma(&to_luma_plane(image)?)
}

/// `out = clamp(round(alpha * in + beta))` on every channel.
pub fn linear_remap(image: &ImageBuffer, alpha: f32, beta: f32) -> EngineResult<ImageBuffer> {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = round_clamp_u8(alpha * i as f32 + beta);
    }
    let data = image.as_raw().iter().map(|&v| lut[v as usize]).collect();
    ImageBuffer::from_raw(image.width(), image.height(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_clamp_behaviour() {
        assert_eq!(round_clamp_u8(2.5), 3);
        assert_eq!(round_clamp_u8(2.4999), 2);
        assert_eq!(round_clamp_u8(-3.0), 0);
        assert_eq!(round_clamp_u8(300.0), 255);
        assert_eq!(round_clamp_u8(f32::NAN), 0);
    }

    #[test]
    fn luma_of_reference_pixel() {
        // 0.299*100 + 0.587*150 + 0.114*200 = 140.75
        assert_eq!(luma(100, 150, 200), 141);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn grey_input_is_a_fixed_point() {
        for v in [0u8, 1, 17, 128, 254, 255] {
            assert_eq!(luma(v, v, v), v);
        }
    }

    #[test]
    fn grayscale_replicates_channels() {
        let img = ImageBuffer::from_pixel(4, 4, [100, 150, 200]).unwrap();
        let out = grayscale(&img).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| p == [141, 141, 141]));
    }

    #[test]
    fn linear_remap_reference_values() {
        let img = ImageBuffer::from_pixel(4, 4, [100, 150, 200]).unwrap();
        let out = linear_remap(&img, 1.3, 40.0).unwrap();
        assert!(out.pixels().all(|p| p == [170, 235, 255]));
    }

    #[test]
    fn linear_remap_identity_and_floor() {
        let img = ImageBuffer::from_fn(16, 16, |x, y| [(x * 16) as u8, (y * 16) as u8, 7]).unwrap();
        assert_eq!(linear_remap(&img, 1.0, 0.0).unwrap(), img);
        let dark = linear_remap(&img, 0.5, -200.0).unwrap();
        assert!(dark.as_raw().iter().all(|&v| v == 0));
    }
}
