//! Preview renderers: surface height ramp and region colouring.

use super::image::DebugImage;
use crate::region::{RegionId, RegionResolver};
use crate::surface::{BEACH_TOP_Y, LAND_MAX_Y, OCEAN_FLOOR_Y, SEA_LEVEL};
use crate::tile_sampler::{SampledTile, TileCoord, TileRequest, sample_tile_sync};
use crate::world_maps::WorldMaps;

/// A rectangle of the world mapped onto preview pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewArea {
    /// World X at the image centre.
    pub center_x: i32,
    /// World Z at the image centre.
    pub center_z: i32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// World blocks per preview pixel.
    pub blocks_per_pixel: i32,
}

impl PreviewArea {
    /// Square area of `radius` blocks around the world origin.
    ///
    /// The side saturates at `i32::MAX` blocks.
    pub fn around_origin(radius: i32, blocks_per_pixel: i32) -> Self {
        let bpp = blocks_per_pixel.max(1);
        let side = (radius.max(1).saturating_mul(2) / bpp).max(1) as u32;
        Self {
            center_x: 0,
            center_z: 0,
            width: side,
            height: side,
            blocks_per_pixel: bpp,
        }
    }

    /// World position sampled by pixel `(px, py)`.
    pub fn world_of(&self, px: u32, py: u32) -> (i32, i32) {
        let (x0, z0) = self.top_left();
        (
            x0 + px as i32 * self.blocks_per_pixel,
            z0 + py as i32 * self.blocks_per_pixel,
        )
    }

    fn top_left(&self) -> (i32, i32) {
        (
            self.center_x - (self.width as i32 / 2) * self.blocks_per_pixel,
            self.center_z - (self.height as i32 / 2) * self.blocks_per_pixel,
        )
    }

    /// Tiles of `tile_size` pixels covering the area. Edge tiles overhang.
    pub fn tile_requests(&self, tile_size: u32) -> Vec<TileRequest> {
        let tile_size = tile_size.max(1);
        let (x0, z0) = self.top_left();
        let tiles_x = self.width.div_ceil(tile_size) as i32;
        let tiles_z = self.height.div_ceil(tile_size) as i32;
        let mut requests = Vec::with_capacity((tiles_x * tiles_z) as usize);
        for tz in 0..tiles_z {
            for tx in 0..tiles_x {
                requests.push(TileRequest::in_grid(
                    TileCoord { x: tx, z: tz },
                    x0,
                    z0,
                    tile_size,
                    self.blocks_per_pixel,
                ));
            }
        }
        requests
    }
}

/// Map a surface height to an RGB colour.
///
/// Bands: deep water → shallow water → beach → lowland → mountain → snow.
pub fn height_to_color(surface_y: i32) -> (u8, u8, u8) {
    let y = surface_y as f64;
    let sea = SEA_LEVEL as f64;
    if y < (OCEAN_FLOOR_Y + sea) * 0.5 {
        (0, 0, 128)
    } else if y < sea {
        (30, 80, 200)
    } else if y <= BEACH_TOP_Y {
        (220, 200, 130)
    } else if y < 140.0 {
        let t = ((y - BEACH_TOP_Y) / (140.0 - BEACH_TOP_Y)).clamp(0.0, 1.0);
        (
            (30.0 + t * 80.0) as u8,
            (160.0 - t * 40.0) as u8,
            (30.0 + t * 20.0) as u8,
        )
    } else if y < 190.0 {
        let t = (y - 140.0) / 50.0;
        (
            (110.0 + t * 40.0) as u8,
            (120.0 - t * 50.0) as u8,
            (50.0 + t * 20.0) as u8,
        )
    } else {
        let t = ((y - 190.0) / (LAND_MAX_Y - 190.0)).min(1.0);
        let base = 150.0 + t * 105.0;
        (base as u8, base as u8, base as u8)
    }
}

/// Colour for a region: its first palette colour, or grey if it has none.
pub fn region_color(region: RegionId, resolver: &RegionResolver) -> (u8, u8, u8) {
    resolver
        .palette()
        .color_of_region(resolver.name(region))
        .map_or((128, 128, 128), |c| c.channels())
}

/// Elevation and region previews assembled tile by tile.
pub struct PreviewCanvas {
    area: PreviewArea,
    elevation: DebugImage,
    regions: DebugImage,
}

impl PreviewCanvas {
    /// Blank canvas for `area`.
    pub fn new(area: PreviewArea) -> Self {
        Self {
            area,
            elevation: DebugImage::new(area.width, area.height),
            regions: DebugImage::new(area.width, area.height),
        }
    }

    /// The area being rendered.
    pub fn area(&self) -> &PreviewArea {
        &self.area
    }

    /// Paint one sampled tile. Samples past the canvas edge are dropped.
    ///
    /// The tile must come from [`PreviewArea::tile_requests`] on this canvas's area.
    pub fn paint(&mut self, tile: &SampledTile, resolver: &RegionResolver) {
        let size = tile.request.size;
        let px0 = tile.request.coord.x as u32 * size;
        let py0 = tile.request.coord.z as u32 * size;
        for j in 0..size {
            for i in 0..size {
                let Some(column) = tile.get(i, j) else {
                    continue;
                };
                let (px, py) = (px0 + i, py0 + j);
                self.elevation.set_pixel(px, py, height_to_color(column.surface_y));
                self.regions.set_pixel(px, py, region_color(column.region, resolver));
            }
        }
    }

    /// The surface height preview.
    pub fn elevation(&self) -> &DebugImage {
        &self.elevation
    }

    /// The region preview.
    pub fn regions(&self) -> &DebugImage {
        &self.regions
    }

    /// Consume the canvas, returning `(elevation, regions)`.
    pub fn into_images(self) -> (DebugImage, DebugImage) {
        (self.elevation, self.regions)
    }
}

fn render_sync(maps: &WorldMaps, area: PreviewArea) -> PreviewCanvas {
    let mut canvas = PreviewCanvas::new(area);
    for request in area.tile_requests(64) {
        let tile = SampledTile {
            columns: sample_tile_sync(maps, &request),
            request,
            sample_time_us: 0,
        };
        canvas.paint(&tile, maps.resolver());
    }
    canvas
}

/// Render a surface height preview on the calling thread.
pub fn render_elevation_preview(maps: &WorldMaps, area: PreviewArea) -> DebugImage {
    render_sync(maps, area).into_images().0
}

/// Render a region preview on the calling thread.
pub fn render_region_preview(maps: &WorldMaps, area: PreviewArea) -> DebugImage {
    render_sync(maps, area).into_images().1
}
