//! Double-pass fBm domain warp shared by every map lookup.
//!
//! Both map fields sample through the same [`DomainWarp`], owned once by
//! [`crate::WorldMaps`], so painted region borders bend exactly like the carved
//! coastlines underneath them.
//!
//! ```text
//!   q      = fbm(p)
//!   r      = fbm(p + q * first_pass_scale)
//!   warped = raw + r * displacement_scale
//! ```
//!
//! Feeding the first pass into the second folds the distortion back on itself,
//! which gives rivers and coasts a turbulent, eroded outline instead of the
//! gentle bends of a single noise pass.

use std::fmt;

use noise::{Fbm, MultiFractal, NoiseFn, Value};

/// World blocks covered by one map pixel. Both rasters share this scale.
pub const MAP_SCALE: i32 = 56;

/// Offset applied to the second channel of the first pass.
const FIRST_PASS_OFFSET: [f64; 2] = [5.2, 1.3];
/// Offset applied to the second channel of the second pass.
const SECOND_PASS_OFFSET: [f64; 2] = [1.7, 9.2];

/// Configuration for the warp's fractal value-noise field.
#[derive(Clone, Debug, PartialEq)]
pub struct WarpParams {
    /// Noise frequency in cycles per map pixel. Default: 1/18 (one broad
    /// meander every 18 pixels, roughly 1000 blocks).
    pub base_frequency: f64,
    /// Number of value-noise octaves per channel. Default: 5.
    pub octaves: usize,
    /// Amplitude ratio between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency ratio between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// How strongly the first-pass vector feeds into the second pass,
    /// in noise-domain units. Default: 3.5.
    pub first_pass_scale: f64,
    /// Final displacement amplitude in map pixels. Default: 2.8
    /// (about 150 blocks of border shift).
    pub displacement_scale: f64,
    /// Seeds for the four decorrelated channels `(qx, qz, rx, rz)`.
    pub seeds: [u32; 4],
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            base_frequency: 1.0 / 18.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            first_pass_scale: 3.5,
            displacement_scale: 2.8,
            seeds: [1337, 7919, 4253, 9001],
        }
    }
}

impl WarpParams {
    /// Parameters that leave every coordinate at its raw pixel position.
    pub fn identity() -> Self {
        Self {
            displacement_scale: 0.0,
            ..Self::default()
        }
    }
}

/// Pure mapping from world block coordinates to distorted map-pixel coordinates.
pub struct DomainWarp {
    channels: [Fbm<Value>; 4],
    params: WarpParams,
}

impl DomainWarp {
    /// Build the four noise channels for `params`.
    pub fn new(params: WarpParams) -> Self {
        let channels = params.seeds.map(|seed| {
            Fbm::<Value>::new(seed)
                .set_octaves(params.octaves)
                .set_frequency(1.0)
                .set_lacunarity(params.lacunarity)
                .set_persistence(params.persistence)
        });
        Self { channels, params }
    }

    /// Un-warped pixel coordinate of a world block on an image of the given size.
    ///
    /// World origin sits at the image centre.
    pub fn raw_pixel(world_x: i32, world_z: i32, image_width: u32, image_height: u32) -> (f64, f64) {
        let scale = MAP_SCALE as f64;
        (
            world_x as f64 / scale + image_width as f64 * 0.5,
            world_z as f64 / scale + image_height as f64 * 0.5,
        )
    }

    /// Warped pixel coordinate of a world block.
    ///
    /// Always finite; may fall outside the image, so callers guard or clamp.
    pub fn warp(&self, world_x: i32, world_z: i32, image_width: u32, image_height: u32) -> (f64, f64) {
        let (raw_x, raw_z) = Self::raw_pixel(world_x, world_z, image_width, image_height);
        if self.params.displacement_scale == 0.0 {
            return (raw_x, raw_z);
        }

        let px = raw_x * self.params.base_frequency;
        let pz = raw_z * self.params.base_frequency;

        let qx = self.channels[0].get([px, pz]);
        let qz = self.channels[1].get([px + FIRST_PASS_OFFSET[0], pz + FIRST_PASS_OFFSET[1]]);

        let sx = px + qx * self.params.first_pass_scale;
        let sz = pz + qz * self.params.first_pass_scale;
        let rx = self.channels[2].get([sx, sz]);
        let rz = self.channels[3].get([sx + SECOND_PASS_OFFSET[0], sz + SECOND_PASS_OFFSET[1]]);

        (
            raw_x + rx * self.params.displacement_scale,
            raw_z + rz * self.params.displacement_scale,
        )
    }

    /// Return a reference to the warp parameters.
    pub fn params(&self) -> &WarpParams {
        &self.params
    }
}

impl fmt::Debug for DomainWarp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainWarp").field("params", &self.params).finish_non_exhaustive()
    }
}

impl Default for DomainWarp {
    fn default() -> Self {
        Self::new(WarpParams::default())
    }
}
