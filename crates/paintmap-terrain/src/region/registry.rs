//! Region registry: maps [`RegionId`] to [`RegionDef`] with name-based lookup.

use hashbrown::HashMap;

use super::{RegionDef, RegionKind};

/// Unique identifier for a registered region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u16);

/// Errors that can occur when registering regions.
#[derive(Debug, thiserror::Error)]
pub enum RegionRegistryError {
    /// A region with this name is already registered.
    #[error("duplicate region name: {0}")]
    DuplicateName(String),

    /// Every [`RegionId`] is taken.
    #[error("cannot register {0}: region id space exhausted")]
    Full(String),
}

/// Stores all registered region definitions with O(1) lookup by ID.
#[derive(Debug)]
pub struct RegionRegistry {
    regions: Vec<RegionDef>,
    name_to_id: HashMap<String, RegionId>,
}

impl RegionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Registers a new region definition, returning its assigned [`RegionId`].
    ///
    /// # Errors
    ///
    /// Returns [`RegionRegistryError::DuplicateName`] if a region with the same
    /// name exists, or [`RegionRegistryError::Full`] once `u16` ids run out.
    pub fn register(&mut self, def: RegionDef) -> Result<RegionId, RegionRegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegionRegistryError::DuplicateName(def.name));
        }
        let Ok(index) = u16::try_from(self.regions.len()) else {
            return Err(RegionRegistryError::Full(def.name));
        };
        let id = RegionId(index);
        self.name_to_id.insert(def.name.clone(), id);
        self.regions.push(def);
        Ok(id)
    }

    /// Returns the definition for the given region ID, if registered.
    pub fn get(&self, id: RegionId) -> Option<&RegionDef> {
        self.regions.get(id.0 as usize)
    }

    /// Looks up a region ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<RegionId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns `true` if at least one region of `kind` is registered.
    pub fn has_kind(&self, kind: RegionKind) -> bool {
        self.regions.iter().any(|def| def.kind == kind)
    }

    /// Returns the number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if no regions are registered.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
