use std::time::Instant;

use crate::buffer::PixelBuffer;
use crate::edge::{detect_and_composite, OutlineStrength};
use crate::error::{PixelateError, Result};
use crate::pixelizer::{check_canvas, check_source, BlockSampling, TargetGrid};
use crate::quantize::{QuantizationLevel, QuantizationStrategy};

/// Everything one pipeline pass needs besides the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub quantization: QuantizationLevel,
    pub quantizer: QuantizationStrategy,
    pub outline: OutlineStrength,
    pub sampling: BlockSampling,
    pub grid: TargetGrid,
    pub output_width: u32,
    pub output_height: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quantization: QuantizationLevel::default(),
            quantizer: QuantizationStrategy::default(),
            outline: OutlineStrength::default(),
            sampling: BlockSampling::default(),
            grid: TargetGrid {
                blocks_wide: 32,
                blocks_high: 32,
            },
            output_width: 350,
            output_height: 350,
        }
    }
}

impl PipelineConfig {
    /// Config whose output canvas matches `source`.
    pub fn for_source(source: &PixelBuffer, grid: TargetGrid) -> Self {
        Self {
            grid,
            output_width: source.width(),
            output_height: source.height(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_canvas(self.output_width, self.output_height, self.grid)
    }
}

/// One full pass: quantize, outline, pixelate. `source` is never modified,
/// so repeated runs never compound.
pub fn run(source: &PixelBuffer, config: &PipelineConfig) -> Result<PixelBuffer> {
    config.validate()?;
    check_source(source)?;

    let start = Instant::now();
    let working = config.quantizer.apply(source.clone(), config.quantization);
    log::debug!("quantized to {} levels in {:?}", config.quantization, start.elapsed());

    let working = detect_and_composite(working, config.outline);
    log::debug!("{} outline done at {:?}", config.outline, start.elapsed());

    let out = config.sampling.pixelizer().pixelize(
        &working,
        config.output_width,
        config.output_height,
        config.grid,
    )?;
    log::debug!(
        "pixelated {}x{} -> {}x{} blocks -> {}x{} in {:?}",
        source.width(),
        source.height(),
        config.grid.blocks_wide,
        config.grid.blocks_high,
        out.width(),
        out.height(),
        start.elapsed()
    );
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Ready,
}

/// Holds the loaded source image between runs.
#[derive(Debug, Default)]
pub struct Pipeline {
    source: Option<PixelBuffer>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the source image. A corrupt buffer leaves the pipeline as it was.
    pub fn load(&mut self, source: PixelBuffer) -> Result<()> {
        source.validate()?;
        self.source = Some(source);
        Ok(())
    }

    pub fn state(&self) -> PipelineState {
        match self.source {
            Some(_) => PipelineState::Ready,
            None => PipelineState::Idle,
        }
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    pub fn run(&self, config: &PipelineConfig) -> Result<PixelBuffer> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| PixelateError::config("no source image loaded"))?;
        run(source, config)
    }
}
