//! Load-time error types. Query paths never fail; only building maps can.

use std::fmt;
use std::path::PathBuf;

use crate::region::{RegionKind, RegionRegistryError};

/// Which of the two painted rasters an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// The hue-coded elevation raster.
    Elevation,
    /// The colour-coded region raster.
    Region,
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Elevation => f.write_str("elevation raster"),
            MapKind::Region => f.write_str("region raster"),
        }
    }
}

/// Fatal errors raised while loading rasters or the region manifest.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    /// A source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Raster bytes could not be decoded as an image.
    #[error("failed to decode {map}: {source}")]
    Decode {
        /// Raster that failed.
        map: MapKind,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Raster decoded to a zero-sized image.
    #[error("{map} has zero width or height")]
    EmptyRaster {
        /// Raster that failed.
        map: MapKind,
    },

    /// Region manifest is not valid RON.
    #[error("failed to parse region manifest: {0}")]
    Manifest(#[from] ron::error::SpannedError),

    /// A palette colour key is not of the form `#RRGGBB`.
    #[error("invalid palette color key {key:?} (expected #RRGGBB)")]
    InvalidColor {
        /// The offending key as written.
        key: String,
    },

    /// Region registration failed.
    #[error(transparent)]
    Registry(#[from] RegionRegistryError),

    /// A required manifest field names a region that was never registered.
    #[error("manifest field `{field}` names unregistered region {name:?}")]
    UnknownRegion {
        /// Manifest field name.
        field: &'static str,
        /// Region name as written.
        name: String,
    },

    /// A default-region field names a region of the wrong kind.
    #[error("manifest field `{field}` names {name:?}, which is not a {expected:?} region")]
    WrongRegionKind {
        /// Manifest field name.
        field: &'static str,
        /// Region name as written.
        name: String,
        /// Kind the field requires.
        expected: RegionKind,
    },
}
