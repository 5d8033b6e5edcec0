//! Classified terrain column shared by generation, collision and picking

use crate::core::types::VoxelCoord;
use super::voxel_type::VoxelType;

/// Noise-derived facts about one (x, z) column
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSample {
    pub x: i32,
    pub z: i32,
    /// Height offset from the baseline
    pub offset: i32,
    /// y of the surface voxel
    pub surface_y: i32,
    /// Type of the surface voxel
    pub surface_type: VoxelType,
    /// Stone mask exceeded its threshold
    pub is_stone: bool,
    /// Tree gate passed; a trunk stands on the surface
    pub has_tree: bool,
    pub tree_height: i32,
}

impl ColumnSample {
    /// Coordinate of the surface voxel
    pub fn surface(&self) -> VoxelCoord {
        VoxelCoord::new(self.x, self.surface_y, self.z)
    }

    /// y of the highest trunk voxel (leaves are centred on it)
    pub fn trunk_top(&self) -> i32 {
        self.surface_y + self.tree_height
    }

    /// Trunk layers 1..=tree_height; empty when the column has no tree
    pub fn trunk_layers(&self) -> std::ops::RangeInclusive<i32> {
        if self.has_tree {
            1..=self.tree_height
        } else {
            // Empty inclusive range
            1..=0
        }
    }

    /// Surface or trunk voxel at height `y`
    pub fn solid_at(&self, y: i32) -> Option<VoxelType> {
        if y == self.surface_y {
            Some(self.surface_type)
        } else if self.trunk_layers().contains(&(y - self.surface_y)) {
            Some(VoxelType::Tree)
        } else {
            None
        }
    }

    /// Visit the surface voxel followed by each trunk layer, bottom to top
    pub fn for_each_solid(&self, mut visit: impl FnMut(VoxelCoord, VoxelType)) {
        visit(self.surface(), self.surface_type);
        for layer in self.trunk_layers() {
            visit(VoxelCoord::new(self.x, self.surface_y + layer, self.z), VoxelType::Tree);
        }
    }
}
