#![no_main]

use libfuzzer_sys::fuzz_target;
use mini_photoshop::engine::decode_image;

fuzz_target!(|data: &[u8]| {
    // Errors are expected for most inputs; only panics and malformed
    // buffers are findings.
    if let Ok((img, _)) = decode_image(data, true) {
        let (w, h) = img.dimensions();
        assert!(w >= 1 && h >= 1);
        assert_eq!(img.as_raw().len(), w as usize * h as usize * 3);
    }
});
