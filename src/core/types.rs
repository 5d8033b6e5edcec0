//! Core type aliases and re-exports

pub use glam::{IVec3, Vec3};

/// Integer world coordinate of a unit voxel
pub type VoxelCoord = IVec3;

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
