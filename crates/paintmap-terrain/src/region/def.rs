//! Region definition: the properties of a single painted region type.

use serde::{Deserialize, Serialize};

/// Whether a region is dry land or a body of water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// Terrain above sea level.
    Land,
    /// Oceans, rivers, lakes.
    Water,
}

/// Full descriptor for a region type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDef {
    /// Unique region name (e.g., "north", "frozen_river").
    pub name: String,
    /// Land or water.
    pub kind: RegionKind,
    /// Cold regions. A frozen land neighbour turns a water correction into
    /// the frozen water region.
    #[serde(default)]
    pub frozen: bool,
}

impl RegionDef {
    /// Shorthand for an unfrozen region.
    pub fn new(name: impl Into<String>, kind: RegionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            frozen: false,
        }
    }

    /// Returns `true` for water regions.
    pub fn is_water(&self) -> bool {
        self.kind == RegionKind::Water
    }
}
