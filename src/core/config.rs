//! World configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::physics::movement::MovementConfig;
use crate::terrain::noise::TerrainParams;
use crate::terrain::voxel_type::VoxelType;

/// Fraction of the window's instance budget given to each voxel type, indexed by `VoxelType::index`
pub const DEFAULT_CAPACITY_FACTORS: [f32; VoxelType::COUNT] =
    [1.0, 0.2, 0.1, 0.7, 0.1, 0.2, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];

/// Top-level configuration for a world session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Master seed; a random one is drawn when absent
    pub seed: Option<f64>,
    /// Chunk radius of the generated window around the observer
    pub view_distance: i32,
    /// Chunk edge length in voxels
    pub chunk_size: i32,
    /// Per-type share of the instance budget
    pub capacity_factors: [f32; VoxelType::COUNT],
    /// Extra instances added on top of the window area
    pub capacity_headroom: usize,
    /// Lowest y an edit may touch
    pub floor_y: i32,
    /// Highest y an edit may touch
    pub ceiling_y: i32,
    /// Maximum pick distance for break/place targeting
    pub reach: f32,
    /// Observer position for a fresh session
    pub spawn_position: Vec3,
    /// Observer height after starting a new world
    pub new_world_height: f32,
    /// Worker threads for the generation runtime
    pub worker_threads: usize,
    pub terrain: TerrainParams,
    pub movement: MovementConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            view_distance: 3,
            chunk_size: 24,
            capacity_factors: DEFAULT_CAPACITY_FACTORS,
            capacity_headroom: 500,
            floor_y: 0,
            ceiling_y: 256,
            reach: 8.0,
            spawn_position: Vec3::new(8.0, 50.0, 8.0),
            new_world_height: 40.0,
            worker_threads: 2,
            terrain: TerrainParams::default(),
            movement: MovementConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values that would make generation or movement meaningless
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(Error::Config(format!("chunk_size must be positive, got {}", self.chunk_size)));
        }
        if self.view_distance < 0 {
            return Err(Error::Config(format!("view_distance must not be negative, got {}", self.view_distance)));
        }
        if self.floor_y > self.ceiling_y {
            return Err(Error::Config(format!(
                "floor_y {} is above ceiling_y {}",
                self.floor_y, self.ceiling_y
            )));
        }
        if self.capacity_factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(Error::Config("capacity factors must be finite and non-negative".into()));
        }
        if self.worker_threads == 0 {
            return Err(Error::Config("worker_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Width of the generated window in voxels
    pub fn window_width(&self) -> i32 {
        2 * self.view_distance * self.chunk_size + self.chunk_size
    }
}
