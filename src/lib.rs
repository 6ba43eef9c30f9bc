//! Pixel-art conversion: optional colour reduction, optional Sobel
//! outlines, then block resampling onto an output canvas.
//!
//! ```
//! use image::Rgba;
//! use pixelart::{run, PixelBuffer, PipelineConfig, QuantizationLevel, TargetGrid};
//!
//! let source = PixelBuffer::filled(4, 4, Rgba([255, 0, 0, 255]));
//! let config = PipelineConfig {
//!     quantization: QuantizationLevel::Four,
//!     ..PipelineConfig::for_source(&source, TargetGrid::new(1, 1).unwrap())
//! };
//! let out = run(&source, &config).unwrap();
//! assert!(out.pixels().iter().all(|p| *p == Rgba([255, 0, 0, 255])));
//! ```

mod buffer;
pub mod codec;
pub mod edge;
mod error;
mod pipeline;
pub mod pixelizer;
pub mod quantize;

pub use buffer::PixelBuffer;
pub use codec::OutputFormat;
pub use edge::{detect_and_composite, EdgeMask, OutlineStrength};
pub use error::{PixelateError, Result};
pub use pipeline::{run, Pipeline, PipelineConfig, PipelineState};
pub use pixelizer::{
    fit_to_max_width, AspectLock, BlockSampling, GridEdit, Pixelizer, TargetGrid,
};
pub use quantize::{quantize, ColorType, KmeansQuantizer, QuantizationLevel, QuantizationStrategy};
