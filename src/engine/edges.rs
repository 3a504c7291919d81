// src/engine/edges.rs
//
// Canny-style edge detection on a pre-smoothed luma plane:
// Sobel gradients -> non-maximum suppression -> hysteresis thresholding.
// Output is a binary plane (0 or 255).

use crate::buffer::LumaPlane;
use crate::engine::common::EngineResult;
use crate::engine::convolve::reflect_101;
use crate::error::EditorError;

/// tan(22.5 deg), splits the gradient angle into four sectors.
const TAN_22_5_DEG: f32 = 0.414_213_56;

pub const EDGE: u8 = 255;
pub const NON_EDGE: u8 = 0;

/// Norm used to turn (gx, gy) into a magnitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientNorm {
    /// `|gx| + |gy|`
    #[default]
    L1,
    /// `sqrt(gx^2 + gy^2)`
    L2,
}

pub trait EdgeDetector {
    /// Binary edge map of `plane`. `low <= high` is the caller's contract.
    fn detect(&self, plane: &LumaPlane, low: f32, high: f32) -> EngineResult<LumaPlane>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CannyDetector {
    norm: GradientNorm,
}

impl CannyDetector {
    pub fn new(norm: GradientNorm) -> Self {
        Self { norm }
    }

    pub fn norm(&self) -> GradientNorm {
        self.norm
    }
}

/// Sobel derivatives with mirrored borders.
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    pub gx: Vec<i32>,
    pub gy: Vec<i32>,
}

pub fn sobel(plane: &LumaPlane) -> Gradients {
    let w = plane.width() as usize;
    let h = plane.height() as usize;
    let src = plane.as_raw();
    let at = |x: isize, y: isize| -> i32 {
        src[reflect_101(y, h) * w + reflect_101(x, w)] as i32
    };

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    for y in 0..h as isize {
        for x in 0..w as isize {
            let p00 = at(x - 1, y - 1);
            let p10 = at(x, y - 1);
            let p20 = at(x + 1, y - 1);
            let p01 = at(x - 1, y);
            let p21 = at(x + 1, y);
            let p02 = at(x - 1, y + 1);
            let p12 = at(x, y + 1);
            let p22 = at(x + 1, y + 1);

            let i = y as usize * w + x as usize;
            gx[i] = (p20 + 2 * p21 + p22) - (p00 + 2 * p01 + p02);
            gy[i] = (p02 + 2 * p12 + p22) - (p00 + 2 * p10 + p20);
        }
    }
    Gradients {
        width: w,
        height: h,
        gx,
        gy,
    }
}

impl Gradients {
    pub fn magnitude(&self, norm: GradientNorm) -> Vec<f32> {
        self.gx
            .iter()
            .zip(&self.gy)
            .map(|(&gx, &gy)| match norm {
                GradientNorm::L1 => (gx.abs() + gy.abs()) as f32,
                GradientNorm::L2 => ((gx * gx + gy * gy) as f32).sqrt(),
            })
            .collect()
    }
}

/// Keep pixels that are local maxima across the edge (along the gradient).
///
/// Neighbours outside the image count as zero. Ties are broken toward the
/// lower index so a symmetric ridge yields a single-pixel line.
pub fn non_maximum_suppression(grad: &Gradients, mag: &[f32]) -> Vec<bool> {
    let (w, h) = (grad.width as isize, grad.height as isize);
    let m = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w || y >= h {
            0.0
        } else {
            mag[(y * w + x) as usize]
        }
    };

    let mut keep = vec![false; mag.len()];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            let value = mag[i];
            if value <= 0.0 {
                continue;
            }
            let gx = grad.gx[i];
            let gy = grad.gy[i];
            let abs_gx = gx.abs() as f32;
            let abs_gy = gy.abs() as f32;
            let same_sign = (gx >= 0) == (gy >= 0);

            // (n1, n2): n1 is the "before" neighbour, n2 the "after" one.
            let (n1, n2) = if abs_gy <= abs_gx * TAN_22_5_DEG {
                (m(x - 1, y), m(x + 1, y))
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (m(x, y - 1), m(x, y + 1))
            } else if same_sign {
                (m(x - 1, y - 1), m(x + 1, y + 1))
            } else {
                (m(x + 1, y - 1), m(x - 1, y + 1))
            };

            keep[i] = value > n1 && value >= n2;
        }
    }
    keep
}

/// Strong pixels (>= high) seed an 8-connected flood through weak pixels
/// (>= low). Everything else is dropped.
pub fn hysteresis(
    width: usize,
    height: usize,
    mag: &[f32],
    keep: &[bool],
    low: f32,
    high: f32,
) -> Vec<u8> {
    let mut out = vec![NON_EDGE; width * height];
    let mut stack: Vec<usize> = Vec::new();

    for (i, (&v, &k)) in mag.iter().zip(keep).enumerate() {
        if k && v >= high {
            out[i] = EDGE;
            stack.push(i);
        }
    }

    while let Some(i) = stack.pop() {
        let x = (i % width) as isize;
        let y = (i / width) as isize;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let j = ny as usize * width + nx as usize;
                if out[j] == NON_EDGE && keep[j] && mag[j] >= low {
                    out[j] = EDGE;
                    stack.push(j);
                }
            }
        }
    }
    out
}

impl EdgeDetector for CannyDetector {
    fn detect(&self, plane: &LumaPlane, low: f32, high: f32) -> EngineResult<LumaPlane> {
        if !(low.is_finite() && high.is_finite()) || low < 0.0 || low > high {
            return Err(EditorError::invalid_parameter(
                "thresholds",
                format!("{low}/{high}"),
                "expected finite 0 <= low <= high",
            ));
        }
        let grad = sobel(plane);
        let mag = grad.magnitude(self.norm);
        let keep = non_maximum_suppression(&grad, &mag);
        let edges = hysteresis(grad.width, grad.height, &mag, &keep, low, high);
        LumaPlane::from_raw(plane.width(), plane.height(), edges)
    }
}
