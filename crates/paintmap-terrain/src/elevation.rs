//! Elevation field: hue-coded raster decoded into a scalar height grid.
//!
//! Colour → elevation:
//! - dark blue (value < 0.25, hue > 0.60) → [`OCEAN_VALUE`]
//! - cyan (hue ≈ 0.49) → 0.0, the coastline
//! - red (hue ≈ 0.02) → 1.0, the highest peak
//!
//! Hues in between map linearly and are clamped to `[0, 1]`.

use image::RgbImage;

use crate::error::{MapKind, MapLoadError};
use crate::raster::{Grid, decode_rgb, rgb_to_hsv, ring_offsets};
use crate::warp::DomainWarp;

/// Elevation stored for ocean pixels and returned outside the raster.
///
/// Slightly negative so interpolation crosses zero right at the coastline.
pub const OCEAN_VALUE: f32 = -0.05;

const HUE_SEA_LEVEL: f32 = 0.49;
const HUE_PEAK: f32 = 0.02;
const OCEAN_MAX_VALUE: f32 = 0.25;
const OCEAN_MIN_HUE: f32 = 0.60;

/// Decoded elevation grid with warped bicubic sampling.
#[derive(Clone, Debug)]
pub struct ElevationField {
    grid: Grid<f32>,
}

impl ElevationField {
    /// Decode an encoded raster (PNG, JPEG).
    ///
    /// # Errors
    ///
    /// Fails if the bytes cannot be decoded or the image is empty.
    pub fn load(bytes: &[u8]) -> Result<Self, MapLoadError> {
        let image = decode_rgb(bytes, MapKind::Elevation)?;
        Self::from_image(&image)
    }

    /// Decode every pixel of an already-loaded image.
    ///
    /// # Errors
    ///
    /// Fails with [`MapLoadError::EmptyRaster`] on a zero-sized image.
    pub fn from_image(image: &RgbImage) -> Result<Self, MapLoadError> {
        let grid = Grid::from_fn(image.width(), image.height(), |x, z| {
            let [r, g, b] = image.get_pixel(x, z).0;
            decode_pixel(r, g, b)
        });
        let field = Self::from_grid(grid)?;

        let cells = field.grid.cells();
        let ocean = cells.iter().filter(|&&e| e == OCEAN_VALUE).count();
        tracing::info!(
            width = field.width(),
            height = field.height(),
            ocean_pixels = ocean,
            land_pixels = cells.len() - ocean,
            "elevation raster decoded"
        );

        Ok(field)
    }

    /// Wrap an already-decoded grid.
    ///
    /// Cells are expected to be [`OCEAN_VALUE`] or within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Fails with [`MapLoadError::EmptyRaster`] if the grid has no cells.
    pub fn from_grid(grid: Grid<f32>) -> Result<Self, MapLoadError> {
        if grid.is_empty() {
            return Err(MapLoadError::EmptyRaster { map: MapKind::Elevation });
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

    /// The decoded grid.
    pub fn grid(&self) -> &Grid<f32> {
        &self.grid
    }

    /// Warped pixel coordinate this field samples for a world block.
    pub fn warped_coord(&self, warp: &DomainWarp, world_x: i32, world_z: i32) -> (f64, f64) {
        warp.warp(world_x, world_z, self.width(), self.height())
    }

    /// Interpolated elevation at a world block.
    pub fn elevation_at(&self, warp: &DomainWarp, world_x: i32, world_z: i32) -> f64 {
        let (mx, mz) = self.warped_coord(warp, world_x, world_z);
        self.sample_bicubic(mx, mz)
    }

    /// Catmull-Rom bicubic sample at a fractional pixel coordinate.
    ///
    /// The result is clamped to the range of the four cells surrounding the
    /// sample, so cubic overshoot can never invent elevations that are not
    /// painted nearby (e.g. next to an ocean-to-peak cliff).
    pub fn sample_bicubic(&self, map_x: f64, map_z: f64) -> f64 {
        let x1 = map_x.floor() as i32;
        let z1 = map_z.floor() as i32;
        let tx = map_x - x1 as f64;
        let tz = map_z - z1 as f64;

        let c00 = self.cell(x1, z1);
        let c10 = self.cell(x1 + 1, z1);
        let c01 = self.cell(x1, z1 + 1);
        let c11 = self.cell(x1 + 1, z1 + 1);
        let lo = c00.min(c10).min(c01.min(c11));
        let hi = c00.max(c10).max(c01.max(c11));

        let rows = [z1 - 1, z1, z1 + 1, z1 + 2].map(|z| self.cubic_row(x1, z, tx));
        let value = catmull_rom(rows[0], rows[1], rows[2], rows[3], tz);

        value.clamp(lo, hi)
    }

    /// Distance in warped pixels from a world block to the nearest land pixel.
    ///
    /// Returns `max_radius + 1` when no land lies within `max_radius` rings.
    pub fn nearest_land_distance(
        &self,
        warp: &DomainWarp,
        world_x: i32,
        world_z: i32,
        max_radius: u32,
    ) -> f64 {
        let (mx, mz) = self.warped_coord(warp, world_x, world_z);
        self.nearest_land_distance_from(mx, mz, max_radius)
    }

    /// Ring search for the nearest land pixel from a fractional pixel coordinate.
    ///
    /// Land pixels are measured from their centres. The scan stops as soon as
    /// the best distance found is shorter than the inner edge of the next ring.
    pub fn nearest_land_distance_from(&self, map_x: f64, map_z: f64, max_radius: u32) -> f64 {
        let not_found = max_radius as f64 + 1.0;
        let px = map_x.floor() as i32;
        let pz = map_z.floor() as i32;
        let ox = map_x - px as f64;
        let oz = map_z - pz as f64;

        let mut best = not_found * not_found;
        let mut found = false;

        for r in 0..=max_radius as i32 {
            let ring_start = (r - 1).max(0) as f64;
            if found && ring_start * ring_start > best {
                break;
            }
            for (dx, dz) in ring_offsets(r) {
                let is_land = self
                    .grid
                    .get(px + dx, pz + dz)
                    .is_some_and(|e| e > 0.0);
                if !is_land {
                    continue;
                }
                let ddx = dx as f64 - ox + 0.5;
                let ddz = dz as f64 - oz + 0.5;
                let d2 = ddx * ddx + ddz * ddz;
                if d2 < best {
                    best = d2;
                    found = true;
                }
            }
        }

        if found { best.sqrt() } else { not_found }
    }

    #[inline]
    fn cell(&self, x: i32, z: i32) -> f64 {
        self.grid.get_or(x, z, OCEAN_VALUE) as f64
    }

    fn cubic_row(&self, x1: i32, z: i32, tx: f64) -> f64 {
        catmull_rom(
            self.cell(x1 - 1, z),
            self.cell(x1, z),
            self.cell(x1 + 1, z),
            self.cell(x1 + 2, z),
            tx,
        )
    }
}

/// Decode one pixel to its stored elevation.
pub fn decode_pixel(r: u8, g: u8, b: u8) -> f32 {
    let hsv = rgb_to_hsv(r, g, b);
    if hsv.v < OCEAN_MAX_VALUE && hsv.h > OCEAN_MIN_HUE {
        OCEAN_VALUE
    } else {
        ((HUE_SEA_LEVEL - hsv.h) / (HUE_SEA_LEVEL - HUE_PEAK)).clamp(0.0, 1.0)
    }
}

/// Catmull-Rom spline through `b` (t = 0) and `c` (t = 1).
#[inline]
fn catmull_rom(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    (-0.5 * a + 1.5 * b - 1.5 * c + 0.5 * d) * t3
        + (a - 2.5 * b + 2.0 * c - 0.5 * d) * t2
        + (-0.5 * a + 0.5 * c) * t
        + b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png_bytes, solid_image};
    use crate::warp::{MAP_SCALE, WarpParams};

    const OCEAN_RGB: [u8; 3] = [0x08, 0x08, 0x30];
    const COAST_RGB: [u8; 3] = [0, 255, 250];
    const PEAK_RGB: [u8; 3] = [255, 31, 0];

    fn step_grid() -> Grid<f32> {
        // Left half ocean, right half peak: the worst case for cubic ringing.
        Grid::from_fn(16, 16, |x, _| if x < 8 { OCEAN_VALUE } else { 1.0 })
    }

    #[test]
    fn test_decode_reference_colors() {
        assert_eq!(decode_pixel(OCEAN_RGB[0], OCEAN_RGB[1], OCEAN_RGB[2]), OCEAN_VALUE);
        let coast = decode_pixel(COAST_RGB[0], COAST_RGB[1], COAST_RGB[2]);
        assert!(coast.abs() < 0.05, "cyan should sit near sea level, got {coast}");
        let peak = decode_pixel(PEAK_RGB[0], PEAK_RGB[1], PEAK_RGB[2]);
        assert!(peak > 0.95, "red should be near the peak, got {peak}");
    }

    #[test]
    fn test_decoded_cells_are_ocean_or_unit_range() {
        for r in (0..=255).step_by(17) {
            for g in (0..=255).step_by(17) {
                for b in (0..=255).step_by(17) {
                    let e = decode_pixel(r as u8, g as u8, b as u8);
                    assert!(
                        e == OCEAN_VALUE || (0.0..=1.0).contains(&e),
                        "({r}, {g}, {b}) decoded to {e}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_load_rejects_undecodable_bytes() {
        let err = ElevationField::load(&[0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::Decode {
                map: MapKind::Elevation,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_sized_raster_is_a_load_error() {
        let err = ElevationField::from_image(&RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, MapLoadError::EmptyRaster { map: MapKind::Elevation }));
        let err = ElevationField::from_grid(Grid::filled(0, 8, 0.5)).unwrap_err();
        assert!(matches!(err, MapLoadError::EmptyRaster { .. }));
    }

    #[test]
    fn test_load_from_png_bytes() {
        let bytes = png_bytes(&solid_image(12, 7, PEAK_RGB));
        let field = ElevationField::load(&bytes).unwrap();
        assert_eq!((field.width(), field.height()), (12, 7));
        assert!(field.grid().cells().iter().all(|&e| e > 0.95));
    }

    #[test]
    fn test_bicubic_hits_grid_values_at_integer_coords() {
        let grid = Grid::from_fn(8, 8, |x, z| ((x + z) % 5) as f32 / 4.0);
        let field = ElevationField::from_grid(grid.clone()).unwrap();
        for z in 0..8 {
            for x in 0..8 {
                let sampled = field.sample_bicubic(x as f64, z as f64);
                let expected = grid.get(x, z).unwrap() as f64;
                assert!((sampled - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_bicubic_never_overshoots_surrounding_cells() {
        let field = ElevationField::from_grid(step_grid()).unwrap();
        for i in 0..=400 {
            for j in 0..=8 {
                let mx = 4.0 + i as f64 * 0.02;
                let mz = 3.0 + j as f64 * 0.5;
                let x1 = mx.floor() as i32;
                let z1 = mz.floor() as i32;
                let corners = [
                    field.cell(x1, z1),
                    field.cell(x1 + 1, z1),
                    field.cell(x1, z1 + 1),
                    field.cell(x1 + 1, z1 + 1),
                ];
                let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let v = field.sample_bicubic(mx, mz);
                assert!(
                    v >= lo && v <= hi,
                    "sample {v} at ({mx}, {mz}) outside [{lo}, {hi}]"
                );
            }
        }
    }

    #[test]
    fn test_out_of_grid_samples_are_ocean() {
        let field = ElevationField::from_grid(Grid::filled(4, 4, 0.5)).unwrap();
        let far = field.sample_bicubic(-50.0, 200.0);
        assert_eq!(far, OCEAN_VALUE as f64);
    }

    #[test]
    fn test_all_ocean_has_no_land_within_radius() {
        let field = ElevationField::from_grid(Grid::filled(32, 32, OCEAN_VALUE)).unwrap();
        let warp = DomainWarp::default();
        for i in -10..10 {
            let d = field.nearest_land_distance(&warp, i * 300, i * -170, 6);
            assert_eq!(d, 7.0);
        }
    }

    #[test]
    fn test_nearest_land_distance_measures_to_pixel_centre() {
        let mut cells = vec![OCEAN_VALUE; 64];
        cells[4 * 8 + 6] = 0.4; // land at (6, 4)
        let field = ElevationField::from_grid(Grid::from_fn(8, 8, |x, z| {
            cells[(z * 8 + x) as usize]
        })).unwrap();

        // Sample at the centre of pixel (2, 4): four pixels due west.
        let d = field.nearest_land_distance_from(2.5, 4.5, 6);
        assert!((d - 4.0).abs() < 1e-9, "expected 4.0, got {d}");

        // Out of range radius reports "not found".
        assert_eq!(field.nearest_land_distance_from(2.5, 4.5, 2), 3.0);

        // Standing on the land pixel itself.
        assert!(field.nearest_land_distance_from(6.5, 4.5, 6) < 1e-9);
    }

    #[test]
    fn test_nearest_land_prefers_closer_diagonal() {
        let field = ElevationField::from_grid(Grid::from_fn(16, 16, |x, z| {
            if (x, z) == (11, 8) || (x, z) == (5, 5) { 0.3 } else { OCEAN_VALUE }
        })).unwrap();
        // From (8.5, 8.5): (11,8) is 3.0 away, (5,5) is ~4.24 away.
        let d = field.nearest_land_distance_from(8.5, 8.5, 8);
        assert!((d - 3.0).abs() < 1e-9, "expected 3.0, got {d}");
    }

    #[test]
    fn test_elevation_at_single_peak_pixel() {
        let field = ElevationField::from_grid(Grid::from_fn(8, 8, |x, z| {
            if (x, z) == (4, 4) { 1.0 } else { OCEAN_VALUE }
        })).unwrap();
        let warp = DomainWarp::new(WarpParams::identity());
        assert!((field.elevation_at(&warp, 0, 0) - 1.0).abs() < 1e-9);
        // A full pixel away we are back in the ocean.
        let e = field.elevation_at(&warp, MAP_SCALE * 2, 0);
        assert!(e < 0.0, "expected ocean two pixels from the peak, got {e}");
    }
}
