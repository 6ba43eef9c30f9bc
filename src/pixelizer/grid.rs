use crate::error::{PixelateError, Result};

/// Number of pixel-art blocks ("dots") across and down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetGrid {
    pub blocks_wide: u32,
    pub blocks_high: u32,
}

/// Which grid dimension the user just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEdit {
    Width(u32),
    Height(u32),
}

/// Keeps the grid at the source image's `width / height` ratio while enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectLock {
    ratio: f64,
    enabled: bool,
}

impl AspectLock {
    /// `ratio` must be finite and positive.
    pub fn new(ratio: f64, enabled: bool) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(PixelateError::config(format!("invalid aspect ratio {ratio}")));
        }
        Ok(Self { ratio, enabled })
    }

    pub fn from_dimensions(width: u32, height: u32, enabled: bool) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PixelateError::config(format!(
                "no aspect ratio for a {width}x{height} image"
            )));
        }
        Self::new(width as f64 / height as f64, enabled)
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Nearest integer, never below one block.
fn derived(value: f64) -> u32 {
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

impl TargetGrid {
    pub fn new(blocks_wide: u32, blocks_high: u32) -> Result<Self> {
        let grid = Self {
            blocks_wide,
            blocks_high,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blocks_wide == 0 || self.blocks_high == 0 {
            return Err(PixelateError::config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.blocks_wide, self.blocks_high
            )));
        }
        Ok(())
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> Result<usize> {
        self.validate()?;
        (self.blocks_wide as usize)
            .checked_mul(self.blocks_high as usize)
            .ok_or_else(|| {
                PixelateError::config(format!(
                    "{}x{} blocks do not fit in memory",
                    self.blocks_wide, self.blocks_high
                ))
            })
    }

    /// Applies a single-dimension edit. With the lock on, the other
    /// dimension follows the aspect ratio; otherwise it is left alone.
    pub fn apply_edit(self, edit: GridEdit, lock: AspectLock) -> Self {
        match (edit, lock.is_enabled()) {
            (GridEdit::Width(w), false) => Self { blocks_wide: w, ..self },
            (GridEdit::Height(h), false) => Self { blocks_high: h, ..self },
            (GridEdit::Width(w), true) => Self {
                blocks_wide: w,
                blocks_high: derived(w as f64 / lock.ratio()),
            },
            (GridEdit::Height(h), true) => Self {
                blocks_wide: derived(h as f64 * lock.ratio()),
                blocks_high: h,
            },
        }
    }

    /// The longer side of a `width x height` image gets `dots` blocks; the
    /// shorter side follows the aspect ratio.
    pub fn from_longest_side(dots: u32, width: u32, height: u32) -> Result<Self> {
        if dots == 0 || width == 0 || height == 0 {
            return Err(PixelateError::config(format!(
                "cannot fit {dots} dots to a {width}x{height} image"
            )));
        }
        let ratio = width as f64 / height as f64;
        if height > width {
            Self::new(derived(dots as f64 * ratio), dots)
        } else {
            Self::new(dots, derived(dots as f64 / ratio))
        }
    }

    /// One block per `scale x scale` source pixels, at least one per axis.
    pub fn from_scale(scale: u32, width: u32, height: u32) -> Result<Self> {
        if scale == 0 {
            return Err(PixelateError::config("scale must be positive"));
        }
        Self::new((width / scale).max(1), (height / scale).max(1))
    }
}

/// Shrinks `width x height` proportionally so it is no wider than `max_width`.
pub fn fit_to_max_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }
    let scaled = height as f64 * max_width as f64 / width as f64;
    (max_width, derived(scaled))
}
