use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{PixelateError, Result};

/// RGBA raster shared by every stage of the pipeline.
///
/// The pixel count always equals `width * height`; every constructor
/// checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba<u8>>,
}

fn expected_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl PixelBuffer {
    /// Fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba([0, 0, 0, 0]))
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; expected_len(width, height)],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba<u8>>) -> Result<Self> {
        let buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Builds a buffer from tightly packed RGBA bytes (4 per pixel).
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(PixelateError::DimensionMismatch {
                width,
                height,
                expected: expected_len(width, height),
                actual: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.pixels().copied().collect(),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| self.get_pixel(x, y))
    }

    /// Re-checks the `width * height` invariant.
    pub fn validate(&self) -> Result<()> {
        let expected = expected_len(self.width, self.height);
        if self.pixels.len() != expected {
            return Err(PixelateError::DimensionMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// `width / height`, the ratio the aspect lock preserves.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn pixels(&self) -> &[Rgba<u8>] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba<u8>] {
        &mut self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Panics when `(x, y)` lies outside the buffer, like `image::ImageBuffer`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[self.index(x, y)]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.index(x, y);
        self.pixels[i] = color;
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.pixels().copied().collect(),
        }
    }
}
