#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use mini_photoshop::engine::{DisplayScaler, FilterEngine};
use mini_photoshop::{DisplayBounds, FilterOperation, ImageBuffer};

#[derive(Arbitrary, Debug)]
struct FilterSeed {
    kind: u8,
    kernel_size: u8,
    sigma: Option<f32>,
    low: f32,
    high: f32,
    alpha: f32,
    beta: f32,
    max_width: u8,
    max_height: u8,
}

impl FilterSeed {
    fn operation(&self) -> FilterOperation {
        match self.kind % 5 {
            0 => FilterOperation::Grayscale,
            1 => FilterOperation::GaussianBlur {
                kernel_size: u32::from(self.kernel_size % 16),
                sigma: self.sigma,
            },
            2 => FilterOperation::Sharpen,
            3 => FilterOperation::EdgeDetect {
                low: self.low,
                high: self.high,
            },
            _ => FilterOperation::BrightnessContrast {
                alpha: self.alpha,
                beta: self.beta,
            },
        }
    }
}

fn build_image(u: &mut Unstructured<'_>) -> Option<ImageBuffer> {
    let width = u32::from(u.arbitrary::<u8>().ok()? % 48) + 1;
    let height = u32::from(u.arbitrary::<u8>().ok()? % 48) + 1;
    let len = (width * height * 3) as usize;
    let mut data = vec![0u8; len];
    for (i, byte) in data.iter_mut().enumerate() {
        *byte = u.arbitrary::<u8>().unwrap_or(i as u8);
    }
    ImageBuffer::from_raw(width, height, data).ok()
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let seed: FilterSeed = match u.arbitrary() {
        Ok(seed) => seed,
        Err(_) => return,
    };
    let Some(img) = build_image(&mut u) else {
        return;
    };

    let op = seed.operation();
    let Ok(out) = FilterEngine::new().apply(Some(&img), &op) else {
        // Invalid parameters must be rejected, never panic.
        return;
    };
    assert_eq!(out.dimensions(), img.dimensions());

    let bounds = DisplayBounds::new(u32::from(seed.max_width), u32::from(seed.max_height));
    if let Ok(frame) = DisplayScaler::new(bounds).fit(Some(&out)) {
        assert!(frame.width <= bounds.max_width && frame.height <= bounds.max_height);
        assert_eq!(frame.pixels.len(), (frame.width * frame.height * 3) as usize);
    }
});
