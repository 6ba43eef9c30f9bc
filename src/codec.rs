//! Decode/encode edge of the crate. The actual codecs come from `image`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;

use crate::buffer::PixelBuffer;
use crate::error::{PixelateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Accepts a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.split('/').nth(1) {
            Some(subtype) if mime.starts_with("image/") => subtype.parse(),
            _ => Err(PixelateError::config(format!("not an image MIME type: {mime:?}"))),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// `pixel-art.png`, `pixel-art.jpeg`.
    pub fn download_name(self) -> String {
        format!("pixel-art.{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PixelateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(PixelateError::config(format!("unsupported output format {other:?}"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes)?;
    Ok(PixelBuffer::from_image(&img))
}

pub fn open<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let img = image::open(path)?;
    Ok(PixelBuffer::from_image(&img))
}

/// Encodes `buffer`. `quality` (1..=100) only matters for JPEG, which also
/// drops the alpha channel.
pub fn encode(buffer: PixelBuffer, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    buffer.validate()?;
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            buffer.into_image().write_with_encoder(PngEncoder::new(&mut bytes))?;
        }
        OutputFormat::Jpeg => {
            if !(1..=100).contains(&quality) {
                return Err(PixelateError::config(format!(
                    "JPEG quality must be 1-100, got {quality}"
                )));
            }
            let rgb = DynamicImage::ImageRgba8(buffer.into_image()).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))?;
        }
    }
    Ok(bytes)
}
