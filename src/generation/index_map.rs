//! Coordinate to instance-slot index published with each generation pass

use std::collections::HashMap;

use crate::core::types::VoxelCoord;
use crate::terrain::voxel_type::VoxelType;

/// Where the instance for a coordinate lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub voxel_type: VoxelType,
    pub slot: u32,
}

/// Coordinate -> (type buffer, slot) for in-place patching of published buffers
#[derive(Clone, Debug, Default)]
pub struct CoordinateIndexMap {
    entries: HashMap<VoxelCoord, IndexEntry>,
}

impl CoordinateIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity) }
    }

    pub fn get(&self, coord: VoxelCoord) -> Option<IndexEntry> {
        self.entries.get(&coord).copied()
    }

    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Record an instance, returning the entry it replaced
    pub fn insert(&mut self, coord: VoxelCoord, voxel_type: VoxelType, slot: u32) -> Option<IndexEntry> {
        self.entries.insert(coord, IndexEntry { voxel_type, slot })
    }

    pub fn remove(&mut self, coord: VoxelCoord) -> Option<IndexEntry> {
        self.entries.remove(&coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VoxelCoord, &IndexEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replace_remove() {
        let mut map = CoordinateIndexMap::new();
        let coord = VoxelCoord::new(1, 30, 1);
        assert!(map.insert(coord, VoxelType::Grass, 4).is_none());

        let old = map.insert(coord, VoxelType::Glass, 0).unwrap();
        assert_eq!(old, IndexEntry { voxel_type: VoxelType::Grass, slot: 4 });
        assert_eq!(map.get(coord).unwrap().voxel_type, VoxelType::Glass);

        assert!(map.remove(coord).is_some());
        assert!(map.is_empty());
        assert!(map.get(coord).is_none());
    }
}
