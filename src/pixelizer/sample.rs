use image::Rgba;

use super::{grid::TargetGrid, Pixelizer, TRANSPARENT};
use crate::buffer::PixelBuffer;

/// Picks the source pixel at the centre of each block. Crisp, cheap, and
/// happy to alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterSamplePixelizer;

fn center(block: u32, block_size: f64, len: u32) -> u32 {
    let pos = ((block as f64 + 0.5) * block_size).floor() as u32;
    pos.min(len - 1)
}

impl Pixelizer for CenterSamplePixelizer {
    fn block_color(&self, src: &PixelBuffer, grid: TargetGrid, bx: u32, by: u32) -> Rgba<u8> {
        if src.is_empty() || bx >= grid.blocks_wide || by >= grid.blocks_high {
            return TRANSPARENT;
        }
        let block_w = src.width() as f64 / grid.blocks_wide as f64;
        let block_h = src.height() as f64 / grid.blocks_high as f64;
        src.get_pixel(
            center(bx, block_w, src.width()),
            center(by, block_h, src.height()),
        )
    }
}
