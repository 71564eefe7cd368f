//! Region system: registry, colour palette, RON manifest, and the resolver
//! that reconciles painted regions with the carved terrain.

mod def;
mod manifest;
mod palette;
mod registry;
mod resolver;

pub use def::{RegionDef, RegionKind};
pub use manifest::{PaletteSpec, RegionManifest};
pub use palette::{Palette, PaletteEntry};
pub use registry::{RegionId, RegionRegistry, RegionRegistryError};
pub use resolver::{REGION_SEARCH_RADIUS, RegionMatch, RegionResolver};
