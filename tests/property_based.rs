use mini_photoshop::engine::{
    decode_image, encode_png, fit_dimensions, reflect_101, DisplayScaler, FilterEngine,
};
use mini_photoshop::{DisplayBounds, FilterOperation, ImageBuffer};
use proptest::prelude::*;

fn image_strategy(max_side: u32) -> impl Strategy<Value = ImageBuffer> {
    (1u32..=max_side, 1u32..=max_side).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<u8>(), (w * h * 3) as usize)
            .prop_map(move |data| ImageBuffer::from_raw(w, h, data).unwrap())
    })
}

fn operation_strategy() -> impl Strategy<Value = FilterOperation> {
    prop_oneof![
        Just(FilterOperation::grayscale()),
        Just(FilterOperation::blur()),
        Just(FilterOperation::sharpen()),
        Just(FilterOperation::edge_detect()),
        Just(FilterOperation::brightness_contrast()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_apply_preserves_dimensions(
        img in image_strategy(24),
        op in operation_strategy(),
    ) {
        let out = FilterEngine::new().apply(Some(&img), &op).unwrap();
        prop_assert_eq!(out.dimensions(), img.dimensions());
        prop_assert_eq!(out.channels(), 3);
        prop_assert_eq!(out.as_raw().len(), img.as_raw().len());
    }

    #[test]
    fn prop_apply_never_mutates_input(
        img in image_strategy(16),
        op in operation_strategy(),
    ) {
        let snapshot = img.clone();
        let _ = FilterEngine::new().apply(Some(&img), &op).unwrap();
        prop_assert_eq!(img, snapshot);
    }

    #[test]
    fn prop_grayscale_channels_are_equal(img in image_strategy(24)) {
        let out = FilterEngine::new()
            .apply(Some(&img), &FilterOperation::grayscale())
            .unwrap();
        for p in out.pixels() {
            prop_assert!(p[0] == p[1] && p[1] == p[2]);
        }
    }

    #[test]
    fn prop_edge_detect_is_binary(img in image_strategy(24)) {
        let out = FilterEngine::new()
            .apply(Some(&img), &FilterOperation::edge_detect())
            .unwrap();
        for p in out.pixels() {
            prop_assert!(p[0] == 0 || p[0] == 255);
            prop_assert!(p[0] == p[1] && p[1] == p[2]);
        }
    }

    #[test]
    fn prop_brightness_contrast_identity(img in image_strategy(24)) {
        let op = FilterOperation::BrightnessContrast { alpha: 1.0, beta: 0.0 };
        let out = FilterEngine::new().apply(Some(&img), &op).unwrap();
        prop_assert_eq!(out, img);
    }

    #[test]
    fn prop_blur_stays_within_input_range(img in image_strategy(16)) {
        let out = FilterEngine::new()
            .apply(Some(&img), &FilterOperation::blur())
            .unwrap();
        for c in 0..3 {
            let channel = |buf: &ImageBuffer| -> (u8, u8) {
                let values = buf.pixels().map(|p| p[c]);
                let min = values.clone().min().unwrap();
                let max = values.max().unwrap();
                (min, max)
            };
            let (lo, hi) = channel(&img);
            let (out_lo, out_hi) = channel(&out);
            prop_assert!(out_lo >= lo && out_hi <= hi);
        }
    }

    #[test]
    fn prop_fit_within_bounds_and_never_upscales(
        w in 1u32..=5000,
        h in 1u32..=5000,
        max_w in 1u32..=800,
        max_h in 1u32..=800,
    ) {
        let (fw, fh, scale) = fit_dimensions(w, h, max_w, max_h);
        prop_assert!(fw >= 1 && fh >= 1);
        prop_assert!(fw <= max_w && fh <= max_h);
        prop_assert!(fw <= w && fh <= h);
        prop_assert!(scale <= 1.0);
        if w <= max_w && h <= max_h {
            prop_assert_eq!((fw, fh), (w, h));
            prop_assert_eq!(scale, 1.0);
        }
    }

    #[test]
    fn prop_display_frame_matches_fit(img in image_strategy(40)) {
        let scaler = DisplayScaler::new(DisplayBounds::new(16, 12));
        let frame = scaler.fit(Some(&img)).unwrap();
        let (w, h, _) = fit_dimensions(img.width(), img.height(), 16, 12);
        prop_assert_eq!(frame.dimensions(), (w, h));
        prop_assert_eq!(frame.pixels.len(), (w * h * 3) as usize);
    }

    #[test]
    fn prop_png_round_trip_is_lossless(img in image_strategy(24)) {
        let bytes = encode_png(&img).unwrap();
        let (decoded, _) = decode_image(&bytes, true).unwrap();
        prop_assert_eq!(decoded, img);
    }

    #[test]
    fn prop_reflect_101_stays_in_range(i in -1000isize..1000, n in 1usize..50) {
        let r = reflect_101(i, n);
        prop_assert!(r < n);
        if (0..n as isize).contains(&i) {
            prop_assert_eq!(r, i as usize);
        }
    }
}
