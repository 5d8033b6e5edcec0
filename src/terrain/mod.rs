//! Procedural terrain: noise field, column classification and voxel types

pub mod noise;
pub mod column;
pub mod voxel_type;

pub use noise::{FeatureParams, NoiseField, TerrainParams};
pub use column::ColumnSample;
pub use voxel_type::VoxelType;
