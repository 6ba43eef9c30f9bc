use image::Rgba;

use super::{grid::TargetGrid, Pixelizer, TRANSPARENT};
use crate::buffer::PixelBuffer;

/// Box filter: each block takes the rounded mean of every source pixel it
/// covers, alpha included (straight, not premultiplied).
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragePixelizer;

/// Source span `[start, end)` of `block`, never empty.
fn span(block: u32, blocks: u32, len: u32) -> (u32, u32) {
    let start = ((block as u64 * len as u64) / blocks as u64) as u32;
    let end = (((block as u64 + 1) * len as u64) / blocks as u64) as u32;
    let start = start.min(len - 1);
    (start, end.clamp(start + 1, len))
}

impl Pixelizer for AveragePixelizer {
    fn block_color(&self, src: &PixelBuffer, grid: TargetGrid, bx: u32, by: u32) -> Rgba<u8> {
        if src.is_empty() || bx >= grid.blocks_wide || by >= grid.blocks_high {
            return TRANSPARENT;
        }
        let (x0, x1) = span(bx, grid.blocks_wide, src.width());
        let (y0, y1) = span(by, grid.blocks_high, src.height());
        let mut sums = [0u64; 4];
        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = src.get_pixel(x, y);
                for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
                    *sum += channel as u64;
                }
            }
        }
        let count = ((x1 - x0) as u64) * ((y1 - y0) as u64);
        Rgba(sums.map(|sum| ((sum + count / 2) / count) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_covers_source() {
        assert_eq!(span(0, 3, 10), (0, 3));
        assert_eq!(span(2, 3, 10), (6, 10));
        // more blocks than pixels still yields a one-pixel span
        assert_eq!(span(4, 5, 2), (1, 2));
    }

    #[test]
    fn test_averages_block() {
        let mut src = PixelBuffer::filled(2, 2, Rgba([0, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([255, 100, 0, 255]));
        src.put_pixel(1, 1, Rgba([255, 100, 1, 255]));
        let grid = TargetGrid::new(1, 1).unwrap();
        let colors = AveragePixelizer.block_colors(&src, grid).unwrap();
        // (0 + 255 + 0 + 255) / 4 = 127.5 -> 128; 200 / 4 = 50; 1 / 4 -> 0
        assert_eq!(colors, vec![Rgba([128, 50, 0, 255])]);
    }

    #[test]
    fn test_uniform_source_unchanged() {
        let src = PixelBuffer::filled(6, 4, Rgba([12, 200, 99, 31]));
        let grid = TargetGrid::new(3, 2).unwrap();
        let out = AveragePixelizer.pixelize(&src, 6, 4, grid).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_zero_grid_does_not_divide() {
        let src = PixelBuffer::filled(2, 2, Rgba([5, 5, 5, 5]));
        let zero = TargetGrid { blocks_wide: 0, blocks_high: 0 };
        assert_eq!(AveragePixelizer.block_color(&src, zero, 0, 0), TRANSPARENT);
        assert!(AveragePixelizer.block_colors(&src, zero).is_err());
    }
}
