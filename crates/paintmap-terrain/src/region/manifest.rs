//! RON region manifest: region definitions, colour palette, and defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RegionDef;
use crate::error::MapLoadError;

/// One palette line as written in the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSpec {
    /// `#RRGGBB` colour key.
    pub color: String,
    /// Region name.
    pub region: String,
}

/// On-disk description of the regions a region raster may contain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionManifest {
    /// Regions in registration order.
    pub regions: Vec<RegionDef>,
    /// Palette in declaration order.
    #[serde(default)]
    pub palette: Vec<PaletteSpec>,
    /// Region returned when nothing else applies. Required.
    pub fallback: String,
    /// Land region used when no dry neighbour is found.
    #[serde(default)]
    pub default_land: Option<String>,
    /// Water region used when no wet neighbour is found.
    #[serde(default)]
    pub default_water: Option<String>,
    /// Water region used next to frozen land.
    #[serde(default)]
    pub frozen_water: Option<String>,
}

impl RegionManifest {
    /// Parse a manifest from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, MapLoadError> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, MapLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| MapLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionKind;

    #[test]
    fn test_parse_full_manifest() {
        let m = RegionManifest::from_ron_str(
            r##"(
                regions: [
                    (name: "north", kind: Land),
                    (name: "always_winter", kind: Land, frozen: true),
                    (name: "river", kind: Water),
                ],
                palette: [
                    (color: "#949038", region: "north"),
                    (color: "#2D6796", region: "river"),
                ],
                fallback: "north",
                default_water: Some("river"),
            )"##,
        )
        .unwrap();
        assert_eq!(m.regions.len(), 3);
        assert!(m.regions[1].frozen);
        assert!(!m.regions[0].frozen);
        assert_eq!(m.regions[2].kind, RegionKind::Water);
        assert_eq!(m.palette[1].color, "#2D6796");
        assert_eq!(m.default_water.as_deref(), Some("river"));
        assert_eq!(m.default_land, None);
        assert_eq!(m.frozen_water, None);
    }

    #[test]
    fn test_missing_fallback_is_a_parse_error() {
        let err = RegionManifest::from_ron_str("(regions: [])").unwrap_err();
        assert!(matches!(err, MapLoadError::Manifest(_)));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.ron");
        let err = RegionManifest::load(&path).unwrap_err();
        assert!(matches!(err, MapLoadError::Io { path: ref p, .. } if *p == path));
    }
}
