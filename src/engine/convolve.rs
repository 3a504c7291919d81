// src/engine/convolve.rs
//
// Spatial convolution over RGB buffers and luma planes.
// Borders are mirrored without repeating the edge pixel (reflect-101).

use crate::buffer::{ImageBuffer, LumaPlane, CHANNELS};
use crate::engine::color::round_clamp_u8;
use crate::engine::common::EngineResult;
use crate::error::EditorError;
use crate::ops::SHARPEN_KERNEL;
use once_cell::sync::Lazy;

/// Kernel size of the smoothing pass that precedes gradient computation.
pub const EDGE_SMOOTHING_SIZE: u32 = 5;

static SHARPEN: Lazy<Kernel> = Lazy::new(|| {
    let weights = SHARPEN_KERNEL
        .iter()
        .flat_map(|row| row.iter().map(|&w| w as f32))
        .collect();
    Kernel {
        size: 3,
        weights,
    }
});

static EDGE_SMOOTHING: Lazy<Kernel1D> =
    Lazy::new(|| Kernel1D::gaussian_taps(EDGE_SMOOTHING_SIZE as usize, auto_sigma(EDGE_SMOOTHING_SIZE)));

/// Square, odd-sized 2-D kernel stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    pub fn new(size: usize, weights: Vec<f32>) -> EngineResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(EditorError::invalid_parameter(
                "kernel_size",
                size.to_string(),
                "must be a positive odd number",
            ));
        }
        if weights.len() != size * size || weights.iter().any(|w| !w.is_finite()) {
            return Err(EditorError::invalid_parameter(
                "kernel",
                format!("{} weights", weights.len()),
                format!("expected {} finite weights", size * size),
            ));
        }
        Ok(Self { size, weights })
    }

    /// The fixed 3x3 sharpening kernel.
    pub fn sharpen() -> &'static Kernel {
        &SHARPEN
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Normalized 1-D kernel applied along both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel1D {
    taps: Vec<f32>,
}

/// Sigma derived from an odd kernel size when none is given.
pub fn auto_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

impl Kernel1D {
    /// Sampled Gaussian of `kernel_size` taps, normalized to sum 1.
    pub fn gaussian(kernel_size: u32, sigma: Option<f32>) -> EngineResult<Self> {
        if kernel_size == 0 || kernel_size % 2 == 0 {
            return Err(EditorError::invalid_parameter(
                "kernel_size",
                kernel_size.to_string(),
                "must be a positive odd number",
            ));
        }
        let sigma = sigma.unwrap_or_else(|| auto_sigma(kernel_size));
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(EditorError::invalid_parameter(
                "sigma",
                sigma.to_string(),
                "must be finite and positive",
            ));
        }
        Ok(Self::gaussian_taps(kernel_size as usize, sigma))
    }

    fn gaussian_taps(size: usize, sigma: f32) -> Self {
        let radius = (size / 2) as f32;
        let denom = 2.0 * sigma * sigma;
        if !denom.is_normal() {
            // sigma too small to sample: identity
            let mut taps = vec![0.0; size];
            taps[size / 2] = 1.0;
            return Self { taps };
        }
        let mut taps: Vec<f32> = (0..size)
            .map(|i| {
                let d = i as f32 - radius;
                (-(d * d) / denom).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { taps }
    }

    /// The 5-tap kernel used before gradient computation.
    pub fn edge_smoothing() -> &'static Kernel1D {
        &EDGE_SMOOTHING
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Mirror index `i` into `0..n` without repeating the border sample.
///
/// `n == 1` always maps to 0.
#[inline]
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Source index for every position in `-radius..n+radius`, offset by `radius`.
fn border_table(n: usize, radius: usize) -> Vec<usize> {
    (0..n + 2 * radius)
        .map(|i| reflect_101(i as isize - radius as isize, n))
        .collect()
}

/// Convolution backend used by the filter engine.
pub trait Convolver {
    /// Full 2-D convolution of every channel.
    fn convolve(&self, image: &ImageBuffer, kernel: &Kernel) -> EngineResult<ImageBuffer>;

    /// Horizontal then vertical pass with the same 1-D kernel.
    fn convolve_separable(&self, image: &ImageBuffer, kernel: &Kernel1D)
        -> EngineResult<ImageBuffer>;

    /// Separable smoothing of a single-channel plane.
    fn smooth_plane(&self, plane: &LumaPlane, kernel: &Kernel1D) -> EngineResult<LumaPlane>;
}

/// Straightforward scalar implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectConvolver;

impl DirectConvolver {
    /// Separable pass over interleaved `channels`-wide samples.
    fn separable(
        data: &[u8],
        width: usize,
        height: usize,
        channels: usize,
        taps: &[f32],
    ) -> Vec<u8> {
        let radius = taps.len() / 2;
        let xs = border_table(width, radius);
        let ys = border_table(height, radius);

        let mut horizontal = vec![0f32; data.len()];
        for y in 0..height {
            let row = &data[y * width * channels..(y + 1) * width * channels];
            let out = &mut horizontal[y * width * channels..(y + 1) * width * channels];
            for x in 0..width {
                for c in 0..channels {
                    let mut acc = 0f32;
                    for (k, &t) in taps.iter().enumerate() {
                        acc += t * row[xs[x + k] * channels + c] as f32;
                    }
                    out[x * channels + c] = acc;
                }
            }
        }

        let stride = width * channels;
        let mut output = vec![0u8; data.len()];
        for y in 0..height {
            for i in 0..stride {
                let mut acc = 0f32;
                for (k, &t) in taps.iter().enumerate() {
                    acc += t * horizontal[ys[y + k] * stride + i];
                }
                output[y * stride + i] = round_clamp_u8(acc);
            }
        }
        output
    }
}

impl Convolver for DirectConvolver {
    fn convolve(&self, image: &ImageBuffer, kernel: &Kernel) -> EngineResult<ImageBuffer> {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let size = kernel.size();
        let radius = kernel.radius();
        let xs = border_table(w, radius);
        let ys = border_table(h, radius);
        let src = image.as_raw();
        let weights = kernel.weights();

        let mut out = vec![0u8; src.len()];
        for y in 0..h {
            for x in 0..w {
                let mut acc = [0f32; CHANNELS];
                for ky in 0..size {
                    let row = ys[y + ky] * w;
                    for kx in 0..size {
                        let weight = weights[ky * size + kx];
                        if weight == 0.0 {
                            continue;
                        }
                        let p = (row + xs[x + kx]) * CHANNELS;
                        for (c, a) in acc.iter_mut().enumerate() {
                            *a += weight * src[p + c] as f32;
                        }
                    }
                }
                let o = (y * w + x) * CHANNELS;
                for (c, a) in acc.iter().enumerate() {
                    out[o + c] = round_clamp_u8(*a);
                }
            }
        }
        ImageBuffer::from_raw(image.width(), image.height(), out)
    }

    fn convolve_separable(
        &self,
        image: &ImageBuffer,
        kernel: &Kernel1D,
    ) -> EngineResult<ImageBuffer> {
        let data = Self::separable(
            image.as_raw(),
            image.width() as usize,
            image.height() as usize,
            CHANNELS,
            kernel.taps(),
        );
        ImageBuffer::from_raw(image.width(), image.height(), data)
    }

    fn smooth_plane(&self, plane: &LumaPlane, kernel: &Kernel1D) -> EngineResult<LumaPlane> {
        let data = Self::separable(
            plane.as_raw(),
            plane.width() as usize,
            plane.height() as usize,
            1,
            kernel.taps(),
        );
        LumaPlane::from_raw(plane.width(), plane.height(), data)
    }
}
