use std::collections::HashSet;

use image::Rgba;
use kmeans_colors::{get_kmeans, Kmeans};
use palette::{FromColor, IntoColor, Lab, Srgb};

use super::QuantizationLevel;
use crate::buffer::PixelBuffer;

/// Colour space the clusters are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorType {
    #[default]
    Lab,
    Rgb,
}

enum ColorVec {
    LabVec(Vec<Lab>),
    RgbVec(Vec<Srgb>),
}

const SEED: u64 = 42;

/// Palette-based colour reduction: clusters the image into as many colours
/// as the quantization level allows and repaints every pixel with its
/// cluster centroid. Deterministic for a given input.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansQuantizer {
    num_runs: u32,
    max_iter: usize,
    color_type: ColorType,
}

impl Default for KmeansQuantizer {
    fn default() -> Self {
        Self::new(3, 20, ColorType::Lab)
    }
}

impl KmeansQuantizer {
    pub fn new(num_runs: u32, max_iter: usize, color_type: ColorType) -> Self {
        Self {
            num_runs: num_runs.max(1),
            max_iter,
            color_type,
        }
    }

    fn converge(&self) -> f32 {
        match self.color_type {
            ColorType::Lab => 5.0,
            ColorType::Rgb => 0.0025,
        }
    }

    pub fn quantize(&self, mut buffer: PixelBuffer, level: QuantizationLevel) -> PixelBuffer {
        let Some(k) = level.levels() else {
            return buffer;
        };
        // Already within the palette budget; clustering could only drift colours.
        let distinct: HashSet<[u8; 3]> =
            buffer.pixels().iter().map(|p| [p[0], p[1], p[2]]).collect();
        if distinct.len() <= k as usize {
            return buffer;
        }

        let (palette, indices) = match get_color_vec(&buffer, self.color_type) {
            ColorVec::LabVec(lab_vec) => self.best_run(&lab_vec, k as usize),
            ColorVec::RgbVec(rgb_vec) => self.best_run(&rgb_vec, k as usize),
        };
        log::debug!(
            "k-means ({:?}) picked {} colours for {} pixels",
            self.color_type,
            palette.len(),
            indices.len()
        );

        for (pixel, &index) in buffer.pixels_mut().iter_mut().zip(indices.iter()) {
            if let Some(color) = palette.get(index as usize) {
                *pixel = Rgba([color.red, color.green, color.blue, pixel[3]]);
            }
        }
        buffer
    }

    fn best_run<C>(&self, colors: &[C], k: usize) -> (Vec<Srgb<u8>>, Vec<u8>)
    where
        C: kmeans_colors::Calculate + Clone + Copy,
        Srgb: FromColor<C>,
    {
        let mut result = Kmeans::<C>::new();
        for run in 0..self.num_runs {
            let run_result = get_kmeans(
                k,
                self.max_iter,
                self.converge(),
                false,
                colors,
                SEED + run as u64,
            );
            if run_result.score < result.score {
                result = run_result;
            }
        }
        let palette = result
            .centroids
            .iter()
            .map(|c| Srgb::from_color(*c).into_format())
            .collect();
        (palette, result.indices)
    }
}

fn to_srgb(pixel: &Rgba<u8>) -> Srgb {
    Srgb::new(
        pixel[0] as f32 / 255.0,
        pixel[1] as f32 / 255.0,
        pixel[2] as f32 / 255.0,
    )
}

fn get_color_vec(buffer: &PixelBuffer, color_type: ColorType) -> ColorVec {
    match color_type {
        ColorType::Lab => ColorVec::LabVec(
            buffer
                .pixels()
                .iter()
                .map(|p| {
                    let lab: Lab = to_srgb(p).into_linear().into_color();
                    lab
                })
                .collect(),
        ),
        ColorType::Rgb => ColorVec::RgbVec(buffer.pixels().iter().map(to_srgb).collect()),
    }
}
