/// Everything that can go wrong between receiving a source image and
/// handing back a pixelated one.
#[derive(Debug, thiserror::Error)]
pub enum PixelateError {
    /// Rejected before any pixel work starts: zero-sized grid or output,
    /// unknown colour/outline level, missing source image.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The buffer claims `width * height` pixels but carries a different count.
    #[error("dimension mismatch: {width}x{height} needs {expected} pixels, buffer holds {actual}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

impl PixelateError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PixelateError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PixelateError>;
