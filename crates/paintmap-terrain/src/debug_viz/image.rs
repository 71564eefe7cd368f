//! A preview image backed by an `image::RgbaImage`.

use std::path::Path;

use hashbrown::HashSet;
use image::{Rgba, RgbaImage};

/// A 2D preview image.
#[derive(Clone, Debug)]
pub struct DebugImage {
    inner: RgbaImage,
}

impl DebugImage {
    /// Create a transparent black image with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RgbaImage::new(width, height),
        }
    }

    /// Set a pixel to an opaque colour. Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, (r, g, b): (u8, u8, u8)) {
        if x < self.inner.width() && y < self.inner.height() {
            self.inner.put_pixel(x, y, Rgba([r, g, b, 255]));
        }
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let [r, g, b, a] = self.inner.get_pixel(x, y).0;
        (r, g, b, a)
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Count the number of unique colours (ignoring alpha) in the image.
    pub fn unique_color_count(&self) -> usize {
        self.inner
            .pixels()
            .map(|p| (p[0], p[1], p[2]))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Encode as PNG at `path`.
    ///
    /// # Errors
    ///
    /// Returns the encoder or I/O error.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.inner.save_with_format(path, image::ImageFormat::Png)
    }

    /// The underlying image buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.inner
    }
}
