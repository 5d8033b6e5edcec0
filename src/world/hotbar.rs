//! Selectable voxel types for placement

use crate::terrain::voxel_type::VoxelType;

pub const HOTBAR_SLOTS: usize = 10;

const DEFAULT_SLOTS: [VoxelType; HOTBAR_SLOTS] = [
    VoxelType::Grass,
    VoxelType::Stone,
    VoxelType::Tree,
    VoxelType::Wood,
    VoxelType::Diamond,
    VoxelType::Quartz,
    VoxelType::Glass,
    VoxelType::Grass,
    VoxelType::Grass,
    VoxelType::Grass,
];

#[derive(Clone, Debug)]
pub struct Hotbar {
    slots: [VoxelType; HOTBAR_SLOTS],
    selected: usize,
}

impl Default for Hotbar {
    fn default() -> Self {
        Self { slots: DEFAULT_SLOTS, selected: 0 }
    }
}

impl Hotbar {
    /// Select a slot; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) {
        if index < HOTBAR_SLOTS {
            self.selected = index;
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_type(&self) -> VoxelType {
        self.slots[self.selected]
    }

    pub fn slots(&self) -> &[VoxelType; HOTBAR_SLOTS] {
        &self.slots
    }
}
