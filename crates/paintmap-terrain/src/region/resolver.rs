//! Region resolver: palette matching plus land/water cross-validation.
//!
//! The painted region raster and the carved elevation never line up pixel for
//! pixel. When a column's surface is under water but the painted region is
//! land (or the other way round), the resolver looks at nearby unwarped pixels
//! for a region of the right kind and falls back to the manifest defaults.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{Palette, PaletteEntry, RegionDef, RegionId, RegionKind, RegionManifest, RegionRegistry};
use crate::classification::ClassificationField;
use crate::error::MapLoadError;
use crate::raster::{Rgb, ring_offsets};
use crate::surface::SEA_LEVEL;
use crate::warp::DomainWarp;

/// Radius in raw pixels of the neighbour scan used for corrections.
pub const REGION_SEARCH_RADIUS: i32 = 4;

/// Palette match for a column and the region it resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionMatch {
    /// Region the painted colour matched.
    pub matched: RegionId,
    /// Region after land/water correction.
    pub resolved: RegionId,
}

/// Turns sampled colours into region ids.
#[derive(Debug)]
pub struct RegionResolver {
    registry: RegionRegistry,
    palette: Palette,
    palette_ids: Vec<Option<RegionId>>,
    fallback: RegionId,
    default_land: Option<RegionId>,
    default_water: Option<RegionId>,
    frozen_water: Option<RegionId>,
    empty_palette_warned: AtomicBool,
}

impl RegionResolver {
    /// Register the manifest's regions and validate its palette and defaults.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate region name, a malformed colour key, an
    /// unregistered fallback, or a default naming a missing or mis-kinded region.
    pub fn from_manifest(manifest: RegionManifest) -> Result<Self, MapLoadError> {
        let mut registry = RegionRegistry::new();
        for def in manifest.regions {
            registry.register(def)?;
        }

        let mut entries = Vec::with_capacity(manifest.palette.len());
        for spec in manifest.palette {
            let color = Rgb::parse_hex(&spec.color)?;
            if registry.lookup_by_name(&spec.region).is_none() {
                tracing::warn!(
                    color = %color,
                    region = %spec.region,
                    "palette entry names an unregistered region; it will resolve to the fallback"
                );
            }
            entries.push(PaletteEntry {
                color,
                region: spec.region,
            });
        }

        let fallback = registry.lookup_by_name(&manifest.fallback).ok_or_else(|| {
            MapLoadError::UnknownRegion {
                field: "fallback",
                name: manifest.fallback.clone(),
            }
        })?;
        let default_land = lookup_default(&registry, "default_land", manifest.default_land, RegionKind::Land)?;
        let default_water =
            lookup_default(&registry, "default_water", manifest.default_water, RegionKind::Water)?;
        let frozen_water =
            lookup_default(&registry, "frozen_water", manifest.frozen_water, RegionKind::Water)?;

        let palette = Palette::new(entries);
        let palette_ids = palette
            .entries()
            .iter()
            .map(|e| registry.lookup_by_name(&e.region))
            .collect();

        tracing::info!(
            regions = registry.len(),
            palette_entries = palette.len(),
            "region manifest loaded"
        );

        Ok(Self {
            registry,
            palette,
            palette_ids,
            fallback,
            default_land,
            default_water,
            frozen_water,
            empty_palette_warned: AtomicBool::new(false),
        })
    }

    /// The registered regions.
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// The colour palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Region returned when nothing else applies.
    pub fn fallback(&self) -> RegionId {
        self.fallback
    }

    /// Definition of a region id produced by this resolver.
    pub fn def(&self, id: RegionId) -> Option<&RegionDef> {
        self.registry.get(id)
    }

    /// Name of a region id, or `"?"` for ids this resolver never hands out.
    pub fn name(&self, id: RegionId) -> &str {
        self.def(id).map_or("?", |d| d.name.as_str())
    }

    /// Nearest palette region for a colour.
    ///
    /// An empty palette or an entry naming an unregistered region gives the
    /// fallback.
    pub fn match_color(&self, color: Rgb) -> RegionId {
        match self.palette.nearest(color) {
            Some(i) => self.palette_ids[i].unwrap_or(self.fallback),
            None => {
                if !self.empty_palette_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!("region palette is empty; every column resolves to the fallback");
                }
                self.fallback
            }
        }
    }

    /// Match the painted colour under a column and correct it against the
    /// column's computed surface height.
    pub fn resolve(
        &self,
        field: &ClassificationField,
        warp: &DomainWarp,
        world_x: i32,
        world_z: i32,
        surface_y: i32,
    ) -> RegionMatch {
        let matched = self.match_color(field.color_at_world(warp, world_x, world_z));
        let terrain_is_water = surface_y < SEA_LEVEL;
        let region_is_water = self.is_water(matched);

        let resolved = if terrain_is_water && !region_is_water && self.registry.has_kind(RegionKind::Water) {
            let origin = field.warped_pixel_of(warp, world_x, world_z);
            self.correct_to_water(field, origin, matched)
        } else if !terrain_is_water && region_is_water && self.registry.has_kind(RegionKind::Land) {
            let origin = field.warped_pixel_of(warp, world_x, world_z);
            self.correct_to_land(field, origin, matched)
        } else {
            matched
        };

        if resolved != matched {
            tracing::trace!(
                world_x,
                world_z,
                matched = self.name(matched),
                resolved = self.name(resolved),
                "region corrected"
            );
        }

        RegionMatch { matched, resolved }
    }

    fn is_water(&self, id: RegionId) -> bool {
        self.def(id).is_some_and(RegionDef::is_water)
    }

    fn is_frozen_land(&self, id: RegionId) -> bool {
        self.def(id).is_some_and(|d| d.frozen && !d.is_water())
    }

    /// Painted land on a wet column.
    fn correct_to_water(&self, field: &ClassificationField, origin: (i32, i32), matched: RegionId) -> RegionId {
        let mut saw_frozen = self.is_frozen_land(matched);
        let nearest = self.scan_neighbours(field, origin, |id| {
            saw_frozen |= self.is_frozen_land(id);
            self.is_water(id)
        });
        if let Some(id) = nearest {
            return id;
        }
        self.frozen_water
            .filter(|_| saw_frozen)
            .or(self.default_water)
            .unwrap_or(matched)
    }

    /// Painted water on a dry column.
    fn correct_to_land(&self, field: &ClassificationField, origin: (i32, i32), matched: RegionId) -> RegionId {
        self.scan_neighbours(field, origin, |id| !self.is_water(id))
            .or(self.default_land)
            .unwrap_or(matched)
    }

    /// Nearest raw-space neighbour (by squared pixel distance, ties by scan
    /// order) whose matched region passes `accept`.
    fn scan_neighbours(
        &self,
        field: &ClassificationField,
        (px, pz): (i32, i32),
        mut accept: impl FnMut(RegionId) -> bool,
    ) -> Option<RegionId> {
        let mut best: Option<(RegionId, i32)> = None;
        for r in 1..=REGION_SEARCH_RADIUS {
            if best.is_some_and(|(_, d2)| r * r >= d2) {
                break;
            }
            for (dx, dz) in ring_offsets(r) {
                let id = self.match_color(field.raw_color_at(px + dx, pz + dz));
                if !accept(id) {
                    continue;
                }
                let d2 = dx * dx + dz * dz;
                if best.is_none_or(|(_, bd)| d2 < bd) {
                    best = Some((id, d2));
                }
            }
        }
        best.map(|(id, _)| id)
    }
}

fn lookup_default(
    registry: &RegionRegistry,
    field: &'static str,
    name: Option<String>,
    expected: RegionKind,
) -> Result<Option<RegionId>, MapLoadError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let id = registry
        .lookup_by_name(&name)
        .ok_or_else(|| MapLoadError::UnknownRegion {
            field,
            name: name.clone(),
        })?;
    if registry.get(id).map(|d| d.kind) != Some(expected) {
        return Err(MapLoadError::WrongRegionKind {
            field,
            name,
            expected,
        });
    }
    Ok(Some(id))
}
