//! Generation request and response exchanged with the worker

use std::sync::Arc;

use crate::terrain::noise::NoiseField;
use crate::terrain::voxel_type::VoxelType;
use crate::voxel::chunk::{ChunkCoord, GenerationWindow};
use crate::voxel::edit::{Override, OverrideLog};
use super::index_map::CoordinateIndexMap;
use super::instance::InstanceBuffers;

/// Everything one generation pass needs; immutable once submitted
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// Assigned by the worker on submit; newer requests supersede older ones
    pub version: u64,
    pub view_distance: i32,
    pub chunk_size: i32,
    pub center: ChunkCoord,
    /// Seed and feature parameters
    pub field: NoiseField,
    /// Snapshot of the edit log taken when the request was built
    pub overrides: Arc<OverrideLog>,
    pub capacity_factors: [f32; VoxelType::COUNT],
    pub capacity_headroom: usize,
}

impl GenerationRequest {
    /// Columns covered by this request
    pub fn window(&self) -> GenerationWindow {
        GenerationWindow::around(self.center, self.view_distance, self.chunk_size)
    }

    /// Total instance budget, split across types by `capacity_factors`
    pub fn max_instances(&self) -> usize {
        let width = self.window().width().max(0) as usize;
        width * width + self.capacity_headroom
    }
}

/// Complete snapshot of the generated window
#[derive(Clone, Debug)]
pub struct GenerationResponse {
    pub version: u64,
    pub center: ChunkCoord,
    pub window: GenerationWindow,
    pub index_map: CoordinateIndexMap,
    pub buffers: InstanceBuffers,
    /// Emissions that did not fit their type's capacity
    pub dropped: usize,
}

impl GenerationResponse {
    /// Live instance count per type
    pub fn instance_counts(&self) -> [usize; VoxelType::COUNT] {
        self.buffers.counts()
    }

    /// Patch the snapshot in place with one edit made after it was requested.
    ///
    /// Removals hide the recorded slot, placements append. Returns false when
    /// the edit is outside the window or had nothing to act on.
    pub fn apply_edit(&mut self, entry: &Override) -> bool {
        if !self.window.contains(entry.x, entry.z) {
            return false;
        }
        let coord = entry.coord();
        let previous = self.index_map.remove(coord);
        if let Some(prev) = previous {
            self.buffers.hide(prev.voxel_type, prev.slot);
        }
        if !entry.placed {
            return previous.is_some();
        }
        match self.buffers.push(entry.voxel_type, coord) {
            Some(slot) => {
                self.index_map.insert(coord, entry.voxel_type, slot);
                true
            }
            None => {
                log::warn!("No room for {} instance at {:?}", entry.voxel_type, coord);
                self.dropped += 1;
                previous.is_some()
            }
        }
    }
}
