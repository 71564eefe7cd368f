//! Colour palette: ordered colour → region-name table with nearest-colour lookup.

use hashbrown::HashMap;

use crate::raster::Rgb;

/// One palette declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Painted colour.
    pub color: Rgb,
    /// Region name the colour stands for.
    pub region: String,
}

/// Ordered palette. Declaration order breaks ties.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    exact: HashMap<Rgb, usize>,
}

impl Palette {
    /// Build a palette from entries in declaration order.
    ///
    /// When a colour is declared twice the first declaration wins.
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        let mut exact = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            exact.entry(entry.color).or_insert(i);
        }
        Self { entries, exact }
    }

    /// Index of the entry closest to `color` by squared RGB distance, or
    /// `None` for an empty palette.
    pub fn nearest(&self, color: Rgb) -> Option<usize> {
        if let Some(&i) = self.exact.get(&color) {
            return Some(i);
        }
        let mut best: Option<(usize, u32)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            let d = entry.color.distance_squared(color);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// First colour declared for a region name.
    pub fn color_of_region(&self, region: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|e| e.region == region)
            .map(|e| e.color)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
