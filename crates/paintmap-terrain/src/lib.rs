//! Terrain from painted maps: a hue-coded elevation raster and a colour-coded
//! region raster turned into per-column surface heights and region ids.
//!
//! Everything hangs off [`WorldMaps`]. Load one, wrap it in a [`MapStore`],
//! and query [`WorldMaps::surface_y`] / [`WorldMaps::region_at`] from as many
//! threads as needed.

mod classification;
mod detail;
mod elevation;
mod error;
mod raster;
mod surface;
mod tile_sampler;
mod warp;
mod world_maps;

pub mod debug_viz;
pub mod region;

pub use classification::{ClassificationField, DEEP_WATER_COLOR};
pub use detail::detail_noise;
pub use elevation::{ElevationField, OCEAN_VALUE};
pub use error::{MapKind, MapLoadError};
pub use raster::{Grid, Rgb};
pub use region::{
    Palette, PaletteEntry, RegionDef, RegionId, RegionKind, RegionManifest, RegionMatch,
    RegionRegistry, RegionRegistryError, RegionResolver,
};
pub use surface::{
    BEACH_TOP_Y, LAND_MAX_Y, OCEAN_FLOOR_Y, SEA_LEVEL, SurfaceColumn, Zone, ZoneCurve,
    column_surface, column_surface_height, detail_amplitude,
};
pub use tile_sampler::{
    SampledTile, SubmitError, TileCoord, TileRequest, TileSampler, sample_tile_sync,
};
pub use warp::{DomainWarp, MAP_SCALE, WarpParams};
pub use world_maps::{ColumnProbe, ColumnSample, MapSources, MapStore, WorldMaps};
