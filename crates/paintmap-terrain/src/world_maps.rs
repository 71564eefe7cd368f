//! [`WorldMaps`]: one loaded set of maps, and [`MapStore`] for swapping them.
//!
//! A `WorldMaps` owns both fields, the region resolver and the single
//! [`DomainWarp`] they all sample through. It is immutable once built, so any
//! number of generation threads can query it through a shared `Arc`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::classification::ClassificationField;
use crate::elevation::ElevationField;
use crate::error::MapLoadError;
use crate::raster::Rgb;
use crate::region::{RegionId, RegionManifest, RegionResolver};
use crate::surface::{SEA_LEVEL, column_surface};
use crate::warp::{DomainWarp, WarpParams};

/// Result of a column query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSample {
    /// Surface block height.
    pub surface_y: i32,
    /// Region after land/water correction.
    pub region: RegionId,
}

/// Everything the maps say about one column, for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnProbe {
    /// World block position.
    pub world: (i32, i32),
    /// Region-raster pixel the warped lookup read.
    pub warped_pixel: (i32, i32),
    /// Colour under the warped lookup.
    pub raw_color: Rgb,
    /// Region the colour matched in the palette.
    pub matched_region: RegionId,
    /// Region after land/water correction.
    pub region: RegionId,
    /// Interpolated elevation.
    pub elevation: f64,
    /// Surface block height.
    pub surface_y: i32,
}

/// File locations of one map set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSources {
    /// Hue-coded elevation raster.
    pub heightmap: PathBuf,
    /// Colour-coded region raster.
    pub regionmap: PathBuf,
    /// RON region manifest.
    pub manifest: PathBuf,
}

/// A fully loaded, immutable map set.
#[derive(Debug)]
pub struct WorldMaps {
    warp: DomainWarp,
    elevation: ElevationField,
    classification: ClassificationField,
    resolver: RegionResolver,
}

impl WorldMaps {
    /// Assemble a map set around the default warp.
    pub fn new(elevation: ElevationField, classification: ClassificationField, resolver: RegionResolver) -> Self {
        Self::with_warp(WarpParams::default(), elevation, classification, resolver)
    }

    /// Assemble a map set around a warp built from `params`.
    pub fn with_warp(
        params: WarpParams,
        elevation: ElevationField,
        classification: ClassificationField,
        resolver: RegionResolver,
    ) -> Self {
        let height_dims = (elevation.width(), elevation.height());
        let region_dims = (classification.width(), classification.height());
        if height_dims != region_dims {
            tracing::warn!(
                ?height_dims,
                ?region_dims,
                "elevation and region rasters differ in size; terrain and regions will not line up"
            );
        }
        Self {
            warp: DomainWarp::new(params),
            elevation,
            classification,
            resolver,
        }
    }

    /// Decode both rasters and the manifest from memory.
    ///
    /// # Errors
    ///
    /// Any decode or manifest error is returned as-is.
    pub fn from_bytes(heightmap: &[u8], regionmap: &[u8], manifest: &str) -> Result<Self, MapLoadError> {
        let elevation = ElevationField::load(heightmap)?;
        let classification = ClassificationField::load(regionmap)?;
        let resolver = RegionResolver::from_manifest(RegionManifest::from_ron_str(manifest)?)?;
        Ok(Self::new(elevation, classification, resolver))
    }

    /// Read and decode a map set from disk.
    ///
    /// # Errors
    ///
    /// Returns the first I/O, decode or manifest error.
    pub fn load(sources: &MapSources) -> Result<Self, MapLoadError> {
        let start = Instant::now();
        let heightmap = read_file(&sources.heightmap)?;
        let regionmap = read_file(&sources.regionmap)?;
        let manifest = std::fs::read_to_string(&sources.manifest).map_err(|source| MapLoadError::Io {
            path: sources.manifest.clone(),
            source,
        })?;
        let maps = Self::from_bytes(&heightmap, &regionmap, &manifest)?;
        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "maps loaded");
        Ok(maps)
    }

    /// Surface block height of a column.
    pub fn surface_y(&self, world_x: i32, world_z: i32) -> i32 {
        column_surface(&self.elevation, &self.warp, world_x, world_z).surface_y
    }

    /// Corrected region of a column.
    pub fn region_at(&self, world_x: i32, world_z: i32) -> RegionId {
        self.sample_column(world_x, world_z).region
    }

    /// Surface height and region of a column, sharing one height computation.
    pub fn sample_column(&self, world_x: i32, world_z: i32) -> ColumnSample {
        let surface_y = self.surface_y(world_x, world_z);
        let region = self
            .resolver
            .resolve(&self.classification, &self.warp, world_x, world_z, surface_y)
            .resolved;
        ColumnSample { surface_y, region }
    }

    /// Every intermediate value behind a column.
    pub fn probe(&self, world_x: i32, world_z: i32) -> ColumnProbe {
        let surface = column_surface(&self.elevation, &self.warp, world_x, world_z);
        let regions = self.resolver.resolve(
            &self.classification,
            &self.warp,
            world_x,
            world_z,
            surface.surface_y,
        );
        ColumnProbe {
            world: (world_x, world_z),
            warped_pixel: self.classification.warped_pixel_of(&self.warp, world_x, world_z),
            raw_color: self.classification.color_at_world(&self.warp, world_x, world_z),
            matched_region: regions.matched,
            region: regions.resolved,
            elevation: surface.elevation,
            surface_y: surface.surface_y,
        }
    }

    /// Sea level in blocks.
    pub fn sea_level(&self) -> i32 {
        SEA_LEVEL
    }

    /// The shared coordinate warp.
    pub fn warp(&self) -> &DomainWarp {
        &self.warp
    }

    /// The elevation field.
    pub fn elevation(&self) -> &ElevationField {
        &self.elevation
    }

    /// The classification field.
    pub fn classification(&self) -> &ClassificationField {
        &self.classification
    }

    /// The region resolver.
    pub fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, MapLoadError> {
    std::fs::read(path).map_err(|source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Holds the current map set and swaps in new ones atomically.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they like;
/// a publish never disturbs queries already running.
#[derive(Debug)]
pub struct MapStore {
    current: RwLock<Arc<WorldMaps>>,
}

impl MapStore {
    /// Store holding `maps`.
    pub fn new(maps: WorldMaps) -> Self {
        Self {
            current: RwLock::new(Arc::new(maps)),
        }
    }

    /// The current map set.
    pub fn snapshot(&self) -> Arc<WorldMaps> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current map set.
    pub fn publish(&self, maps: WorldMaps) {
        *self.current.write() = Arc::new(maps);
    }

    /// Load a new map set from disk and publish it.
    ///
    /// On failure the previous map set stays current.
    pub fn reload(&self, sources: &MapSources) -> Result<(), MapLoadError> {
        match WorldMaps::load(sources) {
            Ok(maps) => {
                self.publish(maps);
                tracing::info!("maps reloaded");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "map reload failed; keeping previous maps");
                Err(err)
            }
        }
    }
}
