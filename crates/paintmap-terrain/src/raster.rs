//! Flat row-major raster grids and the pixel helpers shared by both map fields.

use std::fmt;

use image::RgbImage;

use crate::error::{MapKind, MapLoadError};

/// A 24-bit `0xRRGGBB` colour with alpha stripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Build a colour from its three channels.
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Split into `(r, g, b)`.
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let (r0, g0, b0) = self.channels();
        let (r1, g1, b1) = other.channels();
        let dr = r0.abs_diff(r1) as u32;
        let dg = g0.abs_diff(g1) as u32;
        let db = b0.abs_diff(b1) as u32;
        dr * dr + dg * dg + db * db
    }

    /// Parse a `#RRGGBB` key.
    pub fn parse_hex(key: &str) -> Result<Self, MapLoadError> {
        let invalid = || MapLoadError::InvalidColor {
            key: key.to_string(),
        };
        let digits = key.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Immutable width × height grid stored row-major in one buffer.
///
/// Every accessor takes signed coordinates so callers can probe past the edges
/// and let the grid decide what "outside" means.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Build a grid by evaluating `f(x, z)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for z in 0..height {
            for x in 0..width {
                cells.push(f(x, z));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// A grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if `(x, z)` lies inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as u32) < self.width && (z as u32) < self.height
    }

    /// Cell at `(x, z)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, z: i32) -> Option<T> {
        if self.contains(x, z) {
            Some(self.cells[z as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Cell at `(x, z)`, or `outside` past the edges.
    #[inline]
    pub fn get_or(&self, x: i32, z: i32, outside: T) -> T {
        self.get(x, z).unwrap_or(outside)
    }

    /// Cell at `(x, z)` with both coordinates clamped onto the grid.
    ///
    /// # Panics
    ///
    /// Panics if the grid is empty.
    #[inline]
    pub fn get_clamped(&self, x: i32, z: i32) -> T {
        let cx = x.clamp(0, self.width as i32 - 1);
        let cz = z.clamp(0, self.height as i32 - 1);
        self.cells[cz as usize * self.width as usize + cx as usize]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

/// Pixel colour in HSV, every component in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    /// Hue as a fraction of a full turn.
    pub h: f32,
    /// Saturation.
    pub s: f32,
    /// Value (brightness).
    pub v: f32,
}

/// Convert an 8-bit RGB triple to HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let cmax = r.max(g).max(b);
    let cmin = r.min(g).min(b);
    let delta = cmax - cmin;

    let s = if cmax > 0.0 { delta / cmax } else { 0.0 };
    let mut h = 0.0;
    if delta > 0.0 {
        h = if cmax == r {
            ((g - b) / delta) % 6.0
        } else if cmax == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        h /= 6.0;
        if h < 0.0 {
            h += 1.0;
        }
    }

    Hsv { h, s, v: cmax }
}

/// Decode raster bytes into an RGB image, rejecting empty rasters.
pub fn decode_rgb(bytes: &[u8], map: MapKind) -> Result<RgbImage, MapLoadError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| MapLoadError::Decode { map, source })?
        .to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(MapLoadError::EmptyRaster { map });
    }
    Ok(image)
}

/// Offsets on the square ring at Chebyshev radius `r` around the origin.
///
/// Radius 0 yields only `(0, 0)`. Offsets come out column by column, which
/// fixes the tie-break order for every ring scan in the crate.
pub fn ring_offsets(r: i32) -> impl Iterator<Item = (i32, i32)> {
    (-r..=r).flat_map(move |dx| {
        (-r..=r)
            .filter(move |&dz| r == 0 || dx.abs() == r || dz.abs() == r)
            .map(move |dz| (dx, dz))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_channels_roundtrip() {
        let c = Rgb::from_channels(0x94, 0x90, 0x38);
        assert_eq!(c, Rgb(0x949038));
        assert_eq!(c.channels(), (0x94, 0x90, 0x38));
        assert_eq!(c.to_string(), "#949038");
    }

    #[test]
    fn test_parse_hex_accepts_either_case() {
        assert_eq!(Rgb::parse_hex("#2d6796").unwrap(), Rgb(0x2D6796));
        assert_eq!(Rgb::parse_hex("#FFFFFF").unwrap(), Rgb(0xFFFFFF));
    }

    #[test]
    fn test_parse_hex_rejects_malformed_keys() {
        for key in ["949038", "#94903", "#9490388", "#GG0000", "", "#"] {
            let err = Rgb::parse_hex(key).unwrap_err();
            assert!(
                matches!(err, MapLoadError::InvalidColor { key: ref k } if k == key),
                "{key:?} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn test_grid_row_major_layout() {
        let grid = Grid::from_fn(3, 2, |x, z| x + 10 * z);
        assert_eq!(grid.cells(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.get(2, 1), Some(12));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(-1, 0), None);
    }

    #[test]
    fn test_grid_clamped_and_default_access() {
        let grid = Grid::from_fn(4, 4, |x, z| (x, z));
        assert_eq!(grid.get_clamped(-5, 2), (0, 2));
        assert_eq!(grid.get_clamped(9, 9), (3, 3));
        assert_eq!(grid.get_or(4, 0, (99, 99)), (99, 99));
    }

    #[test]
    fn test_hsv_reference_colors() {
        let red = rgb_to_hsv(255, 0, 0);
        assert!(red.h.abs() < 1e-6 && (red.v - 1.0).abs() < 1e-6);

        let cyan = rgb_to_hsv(0, 255, 255);
        assert!((cyan.h - 0.5).abs() < 1e-6);

        let blue = rgb_to_hsv(0, 0, 255);
        assert!((blue.h - 2.0 / 3.0).abs() < 1e-6);

        let grey = rgb_to_hsv(128, 128, 128);
        assert_eq!(grey.h, 0.0);
        assert_eq!(grey.s, 0.0);
    }

    #[test]
    fn test_ring_offsets_cover_square_perimeter() {
        assert_eq!(ring_offsets(0).collect::<Vec<_>>(), vec![(0, 0)]);
        for r in 1..6 {
            let ring: Vec<_> = ring_offsets(r).collect();
            assert_eq!(ring.len() as i32, 8 * r, "ring {r} size");
            assert!(ring.iter().all(|&(dx, dz)| dx.abs().max(dz.abs()) == r));
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_rgb(b"definitely not a png", MapKind::Region).unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::Decode {
                map: MapKind::Region,
                ..
            }
        ));
    }
}
