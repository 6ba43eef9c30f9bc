use std::fmt;
use std::str::FromStr;

use image::Rgba;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::PixelateError;

/// How eagerly outlines are drawn. A lower threshold marks more pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutlineStrength {
    #[default]
    None,
    Weak,
    Normal,
    Strong,
}

impl OutlineStrength {
    /// Gradient magnitude a pixel must exceed to count as an edge.
    pub fn threshold(self) -> Option<u8> {
        match self {
            OutlineStrength::None => None,
            OutlineStrength::Weak => Some(60),
            OutlineStrength::Normal => Some(40),
            OutlineStrength::Strong => Some(20),
        }
    }
}

impl FromStr for OutlineStrength {
    type Err = PixelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(OutlineStrength::None),
            "weak" => Ok(OutlineStrength::Weak),
            "normal" => Ok(OutlineStrength::Normal),
            "strong" => Ok(OutlineStrength::Strong),
            other => Err(PixelateError::config(format!("unknown outline strength {other:?}"))),
        }
    }
}

impl fmt::Display for OutlineStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutlineStrength::None => "none",
            OutlineStrength::Weak => "weak",
            OutlineStrength::Normal => "normal",
            OutlineStrength::Strong => "strong",
        };
        f.write_str(name)
    }
}

/// Per-pixel edge flags for one detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    width: u32,
    height: u32,
    edges: Vec<bool>,
}

impl EdgeMask {
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.edges[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.edges
    }
}

/// Rec. 601 luma, alpha ignored.
pub fn luminance(buffer: &PixelBuffer) -> Vec<f32> {
    buffer
        .pixels()
        .par_iter()
        .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
        .collect()
}

/// Sobel gradient magnitude saturated to 8 bits.
///
/// Only interior pixels are convolved; the outermost ring stays at zero
/// (no padding, no wraparound).
pub fn gradient_magnitude(buffer: &PixelBuffer) -> Vec<u8> {
    let (width, height) = (buffer.width() as usize, buffer.height() as usize);
    let mut magnitude = vec![0u8; width * height];
    if width < 3 || height < 3 {
        return magnitude;
    }

    let gray = luminance(buffer);
    let at = |x: usize, y: usize| gray[y * width + x];

    magnitude
        .par_chunks_mut(width)
        .enumerate()
        .filter(|(y, _)| *y >= 1 && *y + 1 < height)
        .for_each(|(y, row)| {
            for x in 1..width - 1 {
                let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
                row[x] = (gx * gx + gy * gy).sqrt().min(255.0).round() as u8;
            }
        });
    magnitude
}

/// Marks every pixel whose saturated gradient magnitude is strictly above `threshold`.
pub fn detect_edges(buffer: &PixelBuffer, threshold: u8) -> EdgeMask {
    let edges = gradient_magnitude(buffer)
        .into_iter()
        .map(|m| m > threshold)
        .collect();
    EdgeMask {
        width: buffer.width(),
        height: buffer.height(),
        edges,
    }
}

/// Paints edge pixels black in place (alpha kept). `None` is a no-op.
pub fn detect_and_composite(mut buffer: PixelBuffer, strength: OutlineStrength) -> PixelBuffer {
    let Some(threshold) = strength.threshold() else {
        return buffer;
    };
    let mask = detect_edges(&buffer, threshold);
    log::trace!("{} outline: {} edge pixels", strength, mask.count());

    buffer
        .pixels_mut()
        .par_iter_mut()
        .zip(mask.as_slice().par_iter())
        .filter(|(_, edge)| **edge)
        .for_each(|(pixel, _)| *pixel = Rgba([0, 0, 0, pixel[3]]));
    buffer
}
