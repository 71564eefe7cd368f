//! Classification field: the region raster as a grid of raw 24-bit colours.

use image::RgbImage;

use crate::error::{MapKind, MapLoadError};
use crate::raster::{Grid, Rgb, decode_rgb};
use crate::warp::{DomainWarp, MAP_SCALE};

/// Colour returned for warped lookups that land outside the raster.
pub const DEEP_WATER_COLOR: Rgb = Rgb(0x110751);

/// Decoded region raster.
#[derive(Clone, Debug)]
pub struct ClassificationField {
    grid: Grid<Rgb>,
}

impl ClassificationField {
    /// Decode an encoded raster (PNG, JPEG). Alpha is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the bytes cannot be decoded or the image is empty.
    pub fn load(bytes: &[u8]) -> Result<Self, MapLoadError> {
        let image = decode_rgb(bytes, MapKind::Region)?;
        Self::from_image(&image)
    }

    /// Copy every pixel colour out of an already-loaded image.
    ///
    /// # Errors
    ///
    /// Fails with [`MapLoadError::EmptyRaster`] on a zero-sized image.
    pub fn from_image(image: &RgbImage) -> Result<Self, MapLoadError> {
        let grid = Grid::from_fn(image.width(), image.height(), |x, z| {
            let [r, g, b] = image.get_pixel(x, z).0;
            Rgb::from_channels(r, g, b)
        });
        let field = Self::from_grid(grid)?;
        tracing::info!(
            width = field.width(),
            height = field.height(),
            blocks_per_pixel = MAP_SCALE,
            "region raster decoded"
        );
        Ok(field)
    }

    /// Wrap an already-built colour grid.
    ///
    /// # Errors
    ///
    /// Fails with [`MapLoadError::EmptyRaster`] if the grid has no cells.
    pub fn from_grid(grid: Grid<Rgb>) -> Result<Self, MapLoadError> {
        if grid.is_empty() {
            return Err(MapLoadError::EmptyRaster { map: MapKind::Region });
        }
        Ok(Self { grid })
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The raw colour grid.
    pub fn grid(&self) -> &Grid<Rgb> {
        &self.grid
    }

    /// Colour under a world block after warping, or [`DEEP_WATER_COLOR`]
    /// when the warped pixel falls off the raster.
    pub fn color_at_world(&self, warp: &DomainWarp, world_x: i32, world_z: i32) -> Rgb {
        let (px, pz) = self.rounded_pixel(warp, world_x, world_z);
        self.grid.get_or(px, pz, DEEP_WATER_COLOR)
    }

    /// Unwarped pixel lookup, clamped onto the raster.
    ///
    /// Neighbour scans go through this: re-warping every step of a scan would
    /// curl back onto the same source pixel.
    pub fn raw_color_at(&self, pixel_x: i32, pixel_z: i32) -> Rgb {
        self.grid.get_clamped(pixel_x, pixel_z)
    }

    /// The pixel [`color_at_world`](Self::color_at_world) reads, clamped onto
    /// the raster so it can seed a raw-space scan.
    pub fn warped_pixel_of(&self, warp: &DomainWarp, world_x: i32, world_z: i32) -> (i32, i32) {
        let (px, pz) = self.rounded_pixel(warp, world_x, world_z);
        (
            px.clamp(0, self.width() as i32 - 1),
            pz.clamp(0, self.height() as i32 - 1),
        )
    }

    fn rounded_pixel(&self, warp: &DomainWarp, world_x: i32, world_z: i32) -> (i32, i32) {
        let (mx, mz) = warp.warp(world_x, world_z, self.width(), self.height());
        (mx.round() as i32, mz.round() as i32)
    }
}
