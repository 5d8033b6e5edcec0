//! Feedback events emitted by edits, consumed by audio or UI layers

use crate::core::types::VoxelCoord;
use crate::terrain::voxel_type::VoxelType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoxelEvent {
    Broken { coord: VoxelCoord, voxel_type: VoxelType },
    Placed { coord: VoxelCoord, voxel_type: VoxelType },
}

impl VoxelEvent {
    /// Type whose sound should play
    pub fn voxel_type(&self) -> VoxelType {
        match self {
            VoxelEvent::Broken { voxel_type, .. } | VoxelEvent::Placed { voxel_type, .. } => *voxel_type,
        }
    }

    pub fn coord(&self) -> VoxelCoord {
        match self {
            VoxelEvent::Broken { coord, .. } | VoxelEvent::Placed { coord, .. } => *coord,
        }
    }
}
