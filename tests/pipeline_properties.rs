//! Randomised checks of the pipeline stages against their documented guarantees.

use image::Rgba;
use pixelart::edge::{detect_edges, gradient_magnitude};
use pixelart::pixelizer::{AveragePixelizer, CenterSamplePixelizer};
use pixelart::{
    detect_and_composite, quantize, run, AspectLock, BlockSampling, GridEdit, OutlineStrength,
    PipelineConfig, PixelBuffer, Pixelizer, QuantizationLevel, TargetGrid,
};
use proptest::prelude::*;

fn buffer() -> impl Strategy<Value = PixelBuffer> {
    (1u32..14, 1u32..14).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<[u8; 4]>(), (w * h) as usize).prop_map(move |pixels| {
            PixelBuffer::from_pixels(w, h, pixels.into_iter().map(Rgba).collect())
                .expect("length matches")
        })
    })
}

fn level() -> impl Strategy<Value = QuantizationLevel> {
    prop::sample::select(QuantizationLevel::ALL.to_vec())
}

fn outline() -> impl Strategy<Value = OutlineStrength> {
    prop::sample::select(vec![
        OutlineStrength::Weak,
        OutlineStrength::Normal,
        OutlineStrength::Strong,
    ])
}

fn grid() -> impl Strategy<Value = TargetGrid> {
    (1u32..20, 1u32..20).prop_map(|(w, h)| TargetGrid::new(w, h).expect("non-zero"))
}

proptest! {
    #[test]
    fn quantize_is_idempotent(src in buffer(), level in level()) {
        let once = quantize(src, level);
        let twice = quantize(once.clone(), level);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn quantize_unlimited_is_identity(src in buffer()) {
        prop_assert_eq!(quantize(src.clone(), QuantizationLevel::Unlimited), src);
    }

    #[test]
    fn quantize_never_touches_alpha(src in buffer(), level in level()) {
        let out = quantize(src.clone(), level);
        for (a, b) in src.pixels().iter().zip(out.pixels()) {
            prop_assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn outline_none_is_identity(src in buffer()) {
        prop_assert_eq!(detect_and_composite(src.clone(), OutlineStrength::None), src);
    }

    #[test]
    fn outline_never_touches_border(src in buffer(), strength in outline()) {
        let (w, h) = src.dimensions();
        let out = detect_and_composite(src.clone(), strength);
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    prop_assert_eq!(out.get_pixel(x, y), src.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn uniform_images_have_no_edges(
        (w, h) in (1u32..20, 1u32..20),
        color in any::<[u8; 4]>(),
        strength in outline(),
    ) {
        let src = PixelBuffer::filled(w, h, Rgba(color));
        prop_assert!(gradient_magnitude(&src).iter().all(|&m| m == 0));
        let threshold = strength.threshold().expect("not None");
        prop_assert_eq!(detect_edges(&src, threshold).count(), 0);
    }

    #[test]
    fn edge_pixels_become_black_with_alpha_kept(src in buffer(), strength in outline()) {
        let mask = detect_edges(&src, strength.threshold().expect("not None"));
        let out = detect_and_composite(src.clone(), strength);
        for y in 0..src.height() {
            for x in 0..src.width() {
                let before = src.get_pixel(x, y);
                let after = out.get_pixel(x, y);
                if mask.is_edge(x, y) {
                    prop_assert_eq!(after, Rgba([0, 0, 0, before[3]]));
                } else {
                    prop_assert_eq!(after, before);
                }
            }
        }
    }

    #[test]
    fn pixelate_output_matches_requested_size(
        src in buffer(),
        grid in grid(),
        (ow, oh) in (1u32..40, 1u32..40),
    ) {
        for out in [
            CenterSamplePixelizer.pixelize(&src, ow, oh, grid).unwrap(),
            AveragePixelizer.pixelize(&src, ow, oh, grid).unwrap(),
        ] {
            prop_assert_eq!(out.dimensions(), (ow, oh));
        }
    }

    #[test]
    fn pixelate_colours_come_from_source(
        src in buffer(),
        grid in grid(),
        (ow, oh) in (1u32..30, 1u32..30),
    ) {
        let out = CenterSamplePixelizer.pixelize(&src, ow, oh, grid).unwrap();
        for pixel in out.pixels() {
            prop_assert!(src.pixels().contains(pixel));
        }
    }

    #[test]
    fn blocks_are_solid(
        src in buffer(),
        (bw, bh) in (1u32..6, 1u32..6),
        (mx, my) in (1u32..5, 1u32..5),
    ) {
        // output an exact multiple of the grid so every block is mx x my
        let grid = TargetGrid::new(bw, bh).unwrap();
        let out = CenterSamplePixelizer.pixelize(&src, bw * mx, bh * my, grid).unwrap();
        for by in 0..bh {
            for bx in 0..bw {
                let first = out.get_pixel(bx * mx, by * my);
                for y in 0..my {
                    for x in 0..mx {
                        prop_assert_eq!(out.get_pixel(bx * mx + x, by * my + y), first);
                    }
                }
            }
        }
    }

    #[test]
    fn locked_edit_keeps_ratio(
        (iw, ih) in (1u32..500, 1u32..500),
        edit in 1u32..300,
    ) {
        let lock = AspectLock::from_dimensions(iw, ih, true).unwrap();
        let start = TargetGrid::new(1, 1).unwrap();
        let by_width = start.apply_edit(GridEdit::Width(edit), lock);
        prop_assert_eq!(by_width.blocks_wide, edit);
        prop_assert!(by_width.blocks_high >= 1);
        let expected = ((edit as f64) * ih as f64 / iw as f64).round().max(1.0) as u32;
        prop_assert!(by_width.blocks_high.abs_diff(expected) <= 1);

        let by_height = start.apply_edit(GridEdit::Height(edit), lock);
        prop_assert_eq!(by_height.blocks_high, edit);
        prop_assert!(by_height.blocks_wide >= 1);
    }

    #[test]
    fn runs_are_repeatable(
        src in buffer(),
        level in level(),
        strength in outline(),
        grid in grid(),
    ) {
        let config = PipelineConfig {
            quantization: level,
            outline: strength,
            sampling: BlockSampling::Center,
            ..PipelineConfig::for_source(&src, grid)
        };
        let first = run(&src, &config).unwrap();
        let second = run(&src, &config).unwrap();
        prop_assert_eq!(first.dimensions(), src.dimensions());
        prop_assert_eq!(first, second);
    }
}

#[test]
fn all_red_source_survives_pipeline() {
    let red = Rgba([255, 0, 0, 255]);
    let src = PixelBuffer::filled(4, 4, red);
    let config = PipelineConfig {
        quantization: QuantizationLevel::Four,
        outline: OutlineStrength::None,
        ..PipelineConfig::for_source(&src, TargetGrid::new(1, 1).unwrap())
    };
    let out = run(&src, &config).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    assert!(out.pixels().iter().all(|p| *p == red));
}

#[test]
fn level_four_maps_200_to_170() {
    let src = PixelBuffer::filled(1, 1, Rgba([200, 200, 200, 255]));
    let out = quantize(src, QuantizationLevel::Four);
    assert_eq!(out.get_pixel(0, 0), Rgba([170, 170, 170, 255]));
}

proptest! {
    #[test]
    fn grids_finer_than_canvas_still_render(
        src in buffer(),
        (bw, bh) in (1u32..=u32::MAX, 1u32..=u32::MAX),
        (ow, oh) in (1u32..24, 1u32..24),
    ) {
        let grid = TargetGrid::new(bw, bh).unwrap();
        for sampling in [BlockSampling::Center, BlockSampling::Average] {
            let out = sampling.pixelizer().pixelize(&src, ow, oh, grid).unwrap();
            prop_assert_eq!(out.dimensions(), (ow, oh));
        }
    }
}
