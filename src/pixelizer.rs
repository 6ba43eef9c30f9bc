use image::Rgba;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::{PixelateError, Result};

pub mod average;
pub mod grid;
pub mod sample;

pub use average::AveragePixelizer;
pub use grid::{fit_to_max_width, AspectLock, GridEdit, TargetGrid};
pub use sample::CenterSamplePixelizer;

/// Returned by `block_color` for an empty source or a block outside the grid.
pub(crate) const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Turns a source image into a grid of solid blocks drawn at output size.
pub trait Pixelizer: Sync {
    /// Colour of block `(bx, by)` of `grid`.
    fn block_color(&self, src: &PixelBuffer, grid: TargetGrid, bx: u32, by: u32) -> Rgba<u8>;

    /// One colour per block, row-major, `blocks_wide * blocks_high` long.
    fn block_colors(&self, src: &PixelBuffer, grid: TargetGrid) -> Result<Vec<Rgba<u8>>> {
        let count = grid.block_count()?;
        log::trace!("colouring {count} blocks");
        Ok((0..grid.blocks_high)
            .into_par_iter()
            .flat_map_iter(|by| {
                (0..grid.blocks_wide).map(move |bx| self.block_color(src, grid, bx, by))
            })
            .collect())
    }

    /// Only blocks that land on at least one output pixel are coloured, so a
    /// grid finer than the canvas costs no more than the canvas itself.
    fn pixelize(
        &self,
        src: &PixelBuffer,
        output_width: u32,
        output_height: u32,
        grid: TargetGrid,
    ) -> Result<PixelBuffer> {
        check_inputs(src, output_width, output_height, grid)?;
        let columns = VisibleBlocks::new(output_width, grid.blocks_wide);
        let rows = VisibleBlocks::new(output_height, grid.blocks_high);

        let colors: Vec<Rgba<u8>> = rows
            .blocks
            .par_iter()
            .flat_map_iter(|&by| {
                columns
                    .blocks
                    .iter()
                    .map(move |&bx| self.block_color(src, grid, bx, by))
            })
            .collect();
        Ok(render_blocks(&colors, &columns, &rows))
    }
}

/// Representative colour choice for each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSampling {
    /// Point sample at the block centre.
    #[default]
    Center,
    /// Mean over the whole source block.
    Average,
}

impl BlockSampling {
    pub fn pixelizer(self) -> Box<dyn Pixelizer + Send + Sync> {
        match self {
            BlockSampling::Center => Box::new(CenterSamplePixelizer),
            BlockSampling::Average => Box::new(AveragePixelizer),
        }
    }
}

/// Grid and canvas must both be at least 1x1.
pub(crate) fn check_canvas(
    output_width: u32,
    output_height: u32,
    grid: TargetGrid,
) -> Result<()> {
    grid.validate()?;
    if output_width == 0 || output_height == 0 {
        return Err(PixelateError::config(format!(
            "output must be at least 1x1, got {output_width}x{output_height}"
        )));
    }
    Ok(())
}

pub(crate) fn check_source(src: &PixelBuffer) -> Result<()> {
    src.validate()?;
    if src.is_empty() {
        return Err(PixelateError::config("source image is empty"));
    }
    Ok(())
}

fn check_inputs(
    src: &PixelBuffer,
    output_width: u32,
    output_height: u32,
    grid: TargetGrid,
) -> Result<()> {
    check_canvas(output_width, output_height, grid)?;
    check_source(src)
}

/// Index of the block covering `pos` when `len` pixels are split into `blocks`.
///
/// Integer arithmetic, so the blocks tile `0..len` exactly and the last one
/// ends at `len`. `len` and `blocks` must be non-zero.
fn block_index(pos: u32, len: u32, blocks: u32) -> u32 {
    ((pos as u64 * blocks as u64) / len as u64).min(blocks as u64 - 1) as u32
}

/// The blocks along one axis that some output pixel falls in.
struct VisibleBlocks {
    /// Block indices in ascending order, each once.
    blocks: Vec<u32>,
    /// For every output pixel, its block's position in `blocks`.
    slots: Vec<usize>,
}

impl VisibleBlocks {
    fn new(len: u32, blocks: u32) -> Self {
        let mut visible: Vec<u32> = Vec::new();
        let mut slots = Vec::with_capacity(len as usize);
        for pos in 0..len {
            let block = block_index(pos, len, blocks);
            if visible.last() != Some(&block) {
                visible.push(block);
            }
            slots.push(visible.len() - 1);
        }
        Self {
            blocks: visible,
            slots,
        }
    }
}

/// Fills the canvas with one solid rectangle per visible block. `colors` is
/// row-major over `rows.blocks x columns.blocks`.
fn render_blocks(
    colors: &[Rgba<u8>],
    columns: &VisibleBlocks,
    rows: &VisibleBlocks,
) -> PixelBuffer {
    let stride = columns.blocks.len();
    let mut out = PixelBuffer::new(columns.slots.len() as u32, rows.slots.len() as u32);
    if out.is_empty() {
        return out;
    }

    out.pixels_mut()
        .par_chunks_mut(columns.slots.len())
        .zip(rows.slots.par_iter())
        .for_each(|(row, &slot)| {
            let block_row = &colors[slot * stride..(slot + 1) * stride];
            for (pixel, &bx) in row.iter_mut().zip(columns.slots.iter()) {
                *pixel = block_row[bx];
            }
        });
    out
}
