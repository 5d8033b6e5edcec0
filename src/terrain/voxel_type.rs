//! Voxel type enumeration

use serde::{Deserialize, Serialize};

/// Closed set of voxel kinds. The discriminant is the instance-buffer index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum VoxelType {
    Grass = 0,
    Sand = 1,
    Tree = 2,
    Leaf = 3,
    Dirt = 4,
    Stone = 5,
    Coal = 6,
    Wood = 7,
    Diamond = 8,
    Quartz = 9,
    Glass = 10,
    Bedrock = 11,
}

impl VoxelType {
    /// Number of voxel types
    pub const COUNT: usize = 12;

    /// All types in buffer order
    pub const ALL: [VoxelType; Self::COUNT] = [
        VoxelType::Grass,
        VoxelType::Sand,
        VoxelType::Tree,
        VoxelType::Leaf,
        VoxelType::Dirt,
        VoxelType::Stone,
        VoxelType::Coal,
        VoxelType::Wood,
        VoxelType::Diamond,
        VoxelType::Quartz,
        VoxelType::Glass,
        VoxelType::Bedrock,
    ];

    /// Buffer index of this type
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, matching the serialized form
    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Grass => "grass",
            VoxelType::Sand => "sand",
            VoxelType::Tree => "tree",
            VoxelType::Leaf => "leaf",
            VoxelType::Dirt => "dirt",
            VoxelType::Stone => "stone",
            VoxelType::Coal => "coal",
            VoxelType::Wood => "wood",
            VoxelType::Diamond => "diamond",
            VoxelType::Quartz => "quartz",
            VoxelType::Glass => "glass",
            VoxelType::Bedrock => "bedrock",
        }
    }

    /// Bedrock is the only voxel the player cannot remove
    pub fn is_breakable(self) -> bool {
        self != VoxelType::Bedrock
    }
}

impl std::fmt::Display for VoxelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
