use std::fmt;

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::{PixelateError, Result};

pub mod kmeans;
pub use kmeans::{ColorType, KmeansQuantizer};

/// Number of values each RGB channel may take after colour reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantizationLevel {
    Four,
    Eight,
    Sixteen,
    ThirtyTwo,
    SixtyFour,
    #[default]
    Unlimited,
}

impl QuantizationLevel {
    pub const ALL: [QuantizationLevel; 6] = [
        QuantizationLevel::Four,
        QuantizationLevel::Eight,
        QuantizationLevel::Sixteen,
        QuantizationLevel::ThirtyTwo,
        QuantizationLevel::SixtyFour,
        QuantizationLevel::Unlimited,
    ];

    /// `None` for `Unlimited`.
    pub fn levels(self) -> Option<u32> {
        match self {
            QuantizationLevel::Four => Some(4),
            QuantizationLevel::Eight => Some(8),
            QuantizationLevel::Sixteen => Some(16),
            QuantizationLevel::ThirtyTwo => Some(32),
            QuantizationLevel::SixtyFour => Some(64),
            QuantizationLevel::Unlimited => None,
        }
    }

    /// Step between two neighbouring output values, `255 / (levels - 1)`.
    pub fn factor(self) -> Option<f64> {
        self.levels().map(|levels| 255.0 / (levels - 1) as f64)
    }

    /// Maps every possible channel value to its quantized value.
    pub fn lookup_table(self) -> Option<[u8; 256]> {
        let factor = self.factor()?;
        let mut table = [0u8; 256];
        for (value, out) in table.iter_mut().enumerate() {
            let snapped = (value as f64 / factor).round() * factor;
            *out = snapped.round().clamp(0.0, 255.0) as u8;
        }
        Some(table)
    }
}

impl TryFrom<u32> for QuantizationLevel {
    type Error = PixelateError;

    /// `0` stands for `Unlimited`.
    fn try_from(levels: u32) -> Result<Self> {
        match levels {
            0 => Ok(QuantizationLevel::Unlimited),
            4 => Ok(QuantizationLevel::Four),
            8 => Ok(QuantizationLevel::Eight),
            16 => Ok(QuantizationLevel::Sixteen),
            32 => Ok(QuantizationLevel::ThirtyTwo),
            64 => Ok(QuantizationLevel::SixtyFour),
            other => Err(PixelateError::config(format!(
                "unsupported colour level {other} (expected 4, 8, 16, 32, 64 or unlimited)"
            ))),
        }
    }
}

impl fmt::Display for QuantizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.levels() {
            Some(levels) => write!(f, "{levels}"),
            None => f.write_str("unlimited"),
        }
    }
}

/// How colours are reduced. `Uniform` rounds each channel to a fixed step;
/// `Kmeans` clusters the image into `levels` representative colours.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuantizationStrategy {
    #[default]
    Uniform,
    Kmeans(KmeansQuantizer),
}

impl QuantizationStrategy {
    pub fn apply(&self, buffer: PixelBuffer, level: QuantizationLevel) -> PixelBuffer {
        match self {
            QuantizationStrategy::Uniform => quantize(buffer, level),
            QuantizationStrategy::Kmeans(quantizer) => quantizer.quantize(buffer, level),
        }
    }
}

/// Uniform per-channel quantization: `round(v / factor) * factor` on R, G
/// and B, alpha untouched. `Unlimited` returns the buffer unchanged.
pub fn quantize(mut buffer: PixelBuffer, level: QuantizationLevel) -> PixelBuffer {
    let Some(table) = level.lookup_table() else {
        return buffer;
    };
    log::trace!("uniform quantization to {level} levels per channel");
    buffer.pixels_mut().par_iter_mut().for_each(|pixel| {
        for channel in &mut pixel.0[..3] {
            *channel = table[*channel as usize];
        }
    });
    buffer
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn test_level_four_snaps_to_85() {
        let table = QuantizationLevel::Four.lookup_table().unwrap();
        assert_eq!(table[200], 170);
        assert_eq!(table[255], 255);
        assert_eq!(table[0], 0);
        assert_eq!(table[42], 0);
        assert_eq!(table[43], 85);
    }

    #[test]
    fn test_alpha_untouched() {
        let buffer = PixelBuffer::filled(2, 2, Rgba([200, 100, 30, 77]));
        let out = quantize(buffer, QuantizationLevel::Four);
        assert!(out.pixels().iter().all(|p| *p == Rgba([170, 85, 0, 77])));
    }

    #[test]
    fn test_unlimited_is_identity() {
        let mut buffer = PixelBuffer::new(3, 1);
        buffer.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        buffer.put_pixel(2, 0, Rgba([250, 129, 64, 255]));
        assert_eq!(quantize(buffer.clone(), QuantizationLevel::Unlimited), buffer);
    }

    #[test]
    fn test_outputs_are_multiples_of_factor() {
        for level in QuantizationLevel::ALL {
            let Some(factor) = level.factor() else { continue };
            let table = level.lookup_table().unwrap();
            let distinct: std::collections::BTreeSet<u8> = table.iter().copied().collect();
            assert_eq!(distinct.len() as u32, level.levels().unwrap());
            for value in distinct {
                let steps = (value as f64 / factor).round();
                assert!((steps * factor - value as f64).abs() <= 0.5, "{level}: {value}");
            }
        }
    }

    #[test]
    fn test_try_from_rejects_unknown() {
        assert_eq!(QuantizationLevel::try_from(16).unwrap(), QuantizationLevel::Sixteen);
        assert_eq!(QuantizationLevel::try_from(0).unwrap(), QuantizationLevel::Unlimited);
        assert!(matches!(
            QuantizationLevel::try_from(2),
            Err(PixelateError::InvalidConfiguration(_))
        ));
    }
}
