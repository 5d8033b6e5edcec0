//! Ordered log of player edits layered over procedural terrain.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::VoxelCoord;
use crate::terrain::voxel_type::VoxelType;
use crate::voxel::chunk::GenerationWindow;

/// A single player edit at an integer coordinate.
///
/// `placed = true` puts a voxel of `voxel_type` there regardless of terrain;
/// `placed = false` suppresses whatever the terrain generates there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub voxel_type: VoxelType,
    pub placed: bool,
}

impl Override {
    pub fn placed(coord: VoxelCoord, voxel_type: VoxelType) -> Self {
        Self { x: coord.x, y: coord.y, z: coord.z, voxel_type, placed: true }
    }

    pub fn removed(coord: VoxelCoord, voxel_type: VoxelType) -> Self {
        Self { x: coord.x, y: coord.y, z: coord.z, voxel_type, placed: false }
    }

    pub fn coord(&self) -> VoxelCoord {
        VoxelCoord::new(self.x, self.y, self.z)
    }
}

/// Append/mutate-in-place edit history.
///
/// Reads treat the last entry recorded for a coordinate as authoritative.
#[derive(Clone, Debug, Default)]
pub struct OverrideLog {
    /// Entries in record order
    entries: Vec<Override>,
    /// Entry positions by coordinate, in record order
    coord_index: HashMap<VoxelCoord, Vec<usize>>,
    /// Distinct edited coordinates by (x, z) column
    column_index: HashMap<(i32, i32), Vec<VoxelCoord>>,
}

impl OverrideLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries, preserving their order
    pub fn from_entries(entries: Vec<Override>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.push(entry);
        }
        log
    }

    fn push(&mut self, entry: Override) {
        let coord = entry.coord();
        let idx = self.entries.len();
        self.entries.push(entry);

        let slots = self.coord_index.entry(coord).or_default();
        if slots.is_empty() {
            self.column_index.entry((coord.x, coord.z)).or_default().push(coord);
        }
        slots.push(idx);
    }

    /// Mark the coordinate as removed.
    ///
    /// Mutates the authoritative entry when the coordinate is already tracked,
    /// otherwise appends a new removal. Returns true if an entry was mutated.
    pub fn record_removal(&mut self, coord: VoxelCoord, voxel_type: VoxelType) -> bool {
        if let Some(&idx) = self.coord_index.get(&coord).and_then(|slots| slots.last()) {
            self.entries[idx].placed = false;
            log::debug!("Removal at {:?} updated entry {}", coord, idx);
            true
        } else {
            self.push(Override::removed(coord, voxel_type));
            log::debug!("Removal at {:?} appended", coord);
            false
        }
    }

    /// Append a placement. Never deduplicates against earlier entries.
    pub fn record_placement(&mut self, coord: VoxelCoord, voxel_type: VoxelType) {
        self.push(Override::placed(coord, voxel_type));
        log::debug!("Placed {} at {:?}", voxel_type, coord);
    }

    /// All entries recorded at `coord`, oldest first
    pub fn query(&self, coord: VoxelCoord) -> impl Iterator<Item = &Override> + '_ {
        self.coord_index
            .get(&coord)
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
    }

    /// Authoritative (last) entry at `coord`
    pub fn resolve(&self, coord: VoxelCoord) -> Option<&Override> {
        self.coord_index
            .get(&coord)
            .and_then(|slots| slots.last())
            .map(|&idx| &self.entries[idx])
    }

    /// Any entry exists at `coord`, active or not
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.coord_index.contains_key(&coord)
    }

    /// Authoritative entries in column (x, z)
    pub fn column(&self, x: i32, z: i32) -> impl Iterator<Item = &Override> + '_ {
        self.column_index
            .get(&(x, z))
            .into_iter()
            .flatten()
            .filter_map(|&coord| self.resolve(coord))
    }

    /// One authoritative entry per coordinate, ordered by when it was recorded
    pub fn resolved(&self) -> impl Iterator<Item = &Override> + '_ {
        self.entries.iter().enumerate().filter_map(|(idx, entry)| {
            let last = self.coord_index.get(&entry.coord())?.last()?;
            (*last == idx).then_some(entry)
        })
    }

    /// Authoritative entries whose column lies inside `window`
    pub fn in_window<'a>(&'a self, window: &'a GenerationWindow) -> impl Iterator<Item = &'a Override> + 'a {
        self.resolved().filter(move |e| window.contains(e.x, e.z))
    }

    /// Immutable copy handed to a generation pass
    pub fn snapshot(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    /// Raw entries in record order, duplicates included
    pub fn entries(&self) -> &[Override] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all history (new world / load world)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.coord_index.clear();
        self.column_index.clear();
    }
}
