//! Column height mapping: elevation scalar → surface block height.
//!
//! Four zones, each starting from where the previous one ends:
//!
//! | Zone       | Elevation              | Height                                   |
//! |------------|------------------------|------------------------------------------|
//! | deep water | `e <= -0.04`           | ocean floor, raised near land (rivers)   |
//! | coastal    | `-0.04 < e <= 0`       | ease-in cubic from the floor to sea level|
//! | beach      | `0 < e <= 0.02`        | smoothstep from sea level to beach top   |
//! | land       | `0.02 < e <= 1`        | smoothstep to the land maximum + detail  |

use crate::detail::detail_noise;
use crate::elevation::ElevationField;
use crate::warp::DomainWarp;

/// Sea level in blocks. Columns strictly below it are water.
pub const SEA_LEVEL: i32 = 63;
/// Elevation at or below which a column is open water.
pub const OCEAN_THRESHOLD: f64 = -0.04;
/// Open-ocean floor height.
pub const OCEAN_FLOOR_Y: f64 = 38.0;
/// Floor height of narrow channels right next to land.
pub const RIVER_FLOOR_Y: f64 = 54.0;
/// Land search radius for the river floor, in warped map pixels.
pub const RIVER_SEARCH_RADIUS: u32 = 4;
/// Distance to land (pixels) at which the river floor has faded back to the ocean floor.
pub const RIVER_BLEND_DISTANCE: f64 = 3.0;
/// Exponent of the coastal ease-in curve.
pub const COAST_EXPONENT: f64 = 3.0;
/// Elevation where beach ends and land begins.
pub const BEACH_THRESHOLD: f64 = 0.02;
/// Height at the top of the beach.
pub const BEACH_TOP_Y: f64 = 66.0;
/// Height at elevation 1.0.
pub const LAND_MAX_Y: f64 = 230.0;
/// Elevation span above the beach over which detail fades in.
pub const SHORE_RAMP: f64 = 0.03;
/// Elevation below which land counts as flat and gets extra detail.
pub const FLAT_LAND_LIMIT: f64 = 0.12;
/// Elevation span over which the flat bonus blends back to the base amplitude.
pub const FLAT_BLEND: f64 = 0.08;
/// Detail amplitude on ordinary slopes, in blocks.
pub const BASE_DETAIL_AMPLITUDE: f64 = 6.0;
/// Detail amplitude on flat land, in blocks.
pub const FLAT_BONUS_AMPLITUDE: f64 = 10.0;
/// Elevation above which detail fades out towards the peaks.
pub const PEAK_FADE_START: f64 = 0.75;

/// Cubic smoothstep of `t` clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Which zone an elevation falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Open or deep water.
    DeepWater,
    /// Seabed rising towards the shore.
    Coastal,
    /// Between sea level and the beach top.
    Beach,
    /// Everything above the beach.
    Land,
}

impl Zone {
    /// Classify an elevation.
    pub fn of(elevation: f64) -> Self {
        if elevation <= OCEAN_THRESHOLD {
            Zone::DeepWater
        } else if elevation <= 0.0 {
            Zone::Coastal
        } else if elevation <= BEACH_THRESHOLD {
            Zone::Beach
        } else {
            Zone::Land
        }
    }
}

/// Continuous piecewise height curve for one column, before detail noise.
///
/// The only per-column input besides elevation is the seabed floor, which
/// rises from [`OCEAN_FLOOR_Y`] towards [`RIVER_FLOOR_Y`] near land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneCurve {
    floor: f64,
}

impl ZoneCurve {
    /// Curve with the open-ocean floor.
    pub fn open_ocean() -> Self {
        Self { floor: OCEAN_FLOOR_Y }
    }

    /// Curve whose floor is raised by proximity to land.
    ///
    /// `land_distance` is in warped map pixels; anything at or beyond
    /// [`RIVER_BLEND_DISTANCE`] gives the open-ocean floor.
    pub fn near_land(land_distance: f64) -> Self {
        let proximity = 1.0 - (land_distance / RIVER_BLEND_DISTANCE).clamp(0.0, 1.0);
        Self {
            floor: lerp(OCEAN_FLOOR_Y, RIVER_FLOOR_Y, smoothstep(proximity)),
        }
    }

    /// Seabed floor of this curve.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Continuous height for an elevation.
    pub fn height(&self, elevation: f64) -> f64 {
        let sea = SEA_LEVEL as f64;
        match Zone::of(elevation) {
            Zone::DeepWater => self.floor,
            Zone::Coastal => {
                let t = (elevation - OCEAN_THRESHOLD) / -OCEAN_THRESHOLD;
                self.floor + (sea - self.floor) * t.powf(COAST_EXPONENT)
            }
            Zone::Beach => lerp(sea, BEACH_TOP_Y, smoothstep(elevation / BEACH_THRESHOLD)),
            Zone::Land => {
                let t = (elevation - BEACH_THRESHOLD) / (1.0 - BEACH_THRESHOLD);
                lerp(BEACH_TOP_Y, LAND_MAX_Y, smoothstep(t))
            }
        }
    }
}

/// Amplitude of the detail layer at an elevation, in blocks.
///
/// Zero at the beach edge, the flat bonus on low land, the base amplitude on
/// slopes, and back to zero at the peaks.
pub fn detail_amplitude(elevation: f64) -> f64 {
    if elevation <= BEACH_THRESHOLD {
        return 0.0;
    }
    let shore = smoothstep((elevation - BEACH_THRESHOLD) / SHORE_RAMP);
    let flatness = smoothstep((elevation - FLAT_LAND_LIMIT) / FLAT_BLEND);
    let amplitude = lerp(FLAT_BONUS_AMPLITUDE, BASE_DETAIL_AMPLITUDE, flatness);
    let peak = 1.0 - smoothstep((elevation - PEAK_FADE_START) / (1.0 - PEAK_FADE_START));
    shore * amplitude * peak
}

/// Elevation and final height of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceColumn {
    /// Interpolated elevation under the column.
    pub elevation: f64,
    /// Surface block height.
    pub surface_y: i32,
}

/// Compute the surface of a column.
pub fn column_surface(field: &ElevationField, warp: &DomainWarp, world_x: i32, world_z: i32) -> SurfaceColumn {
    let (mx, mz) = field.warped_coord(warp, world_x, world_z);
    let elevation = field.sample_bicubic(mx, mz);

    let height = match Zone::of(elevation) {
        Zone::DeepWater | Zone::Coastal => {
            let dist = field.nearest_land_distance_from(mx, mz, RIVER_SEARCH_RADIUS);
            ZoneCurve::near_land(dist).height(elevation)
        }
        Zone::Beach => ZoneCurve::open_ocean().height(elevation),
        Zone::Land => {
            let base = ZoneCurve::open_ocean().height(elevation);
            let detailed = base + detail_amplitude(elevation) * detail_noise(world_x, world_z);
            detailed.max(BEACH_TOP_Y + 1.0)
        }
    };

    SurfaceColumn {
        elevation,
        surface_y: height.floor() as i32,
    }
}

/// Surface block height of a column.
pub fn column_surface_height(field: &ElevationField, warp: &DomainWarp, world_x: i32, world_z: i32) -> i32 {
    column_surface(field, warp, world_x, world_z).surface_y
}
