//! Chunk addressing for column-streamed terrain

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;

/// Integer coordinate of a chunk column in the world grid (y is not chunked)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert a continuous world position to its chunk
    pub fn from_world_pos(pos: Vec3, chunk_size: i32) -> Self {
        let size = chunk_size as f32;
        Self {
            x: (pos.x / size).floor() as i32,
            z: (pos.z / size).floor() as i32,
        }
    }

    /// Minimum voxel x/z of this chunk
    pub fn voxel_origin(&self, chunk_size: i32) -> (i32, i32) {
        (self.x * chunk_size, self.z * chunk_size)
    }
}

/// Half-open square of voxel columns covered by one generation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationWindow {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl GenerationWindow {
    /// Chunks `center ± distance`, i.e. `2 * distance * chunk_size + chunk_size` columns wide
    pub fn around(center: ChunkCoord, distance: i32, chunk_size: i32) -> Self {
        let (ox, oz) = center.voxel_origin(chunk_size);
        let reach = distance * chunk_size;
        Self {
            min_x: ox - reach,
            max_x: ox + reach + chunk_size,
            min_z: oz - reach,
            max_z: oz + reach + chunk_size,
        }
    }

    /// Columns along one side
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Column (x, z) lies inside the window
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x < self.max_x && z >= self.min_z && z < self.max_z
    }

    /// Window grown by `margin` columns on every side
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_z: self.min_z - margin,
            max_z: self.max_z + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_pos_floors() {
        assert_eq!(ChunkCoord::from_world_pos(Vec3::new(8.0, 50.0, 8.0), 24), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world_pos(Vec3::new(-0.1, 0.0, 24.0), 24), ChunkCoord::new(-1, 1));
        assert_eq!(ChunkCoord::from_world_pos(Vec3::new(-24.0, 0.0, -24.1), 24), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_window_bounds() {
        let window = GenerationWindow::around(ChunkCoord::new(1, -1), 3, 24);
        assert_eq!(window.width(), 168);
        assert_eq!(window.min_x, -48);
        assert_eq!(window.max_x, 120);
        assert_eq!(window.min_z, -96);
        assert_eq!(window.max_z, 72);
        assert!(window.contains(-48, -96));
        assert!(!window.contains(120, 0));
        assert!(!window.contains(0, 72));
    }

    #[test]
    fn test_expanded() {
        let window = GenerationWindow::around(ChunkCoord::new(0, 0), 0, 24).expanded(3);
        assert_eq!(window.width(), 30);
        assert!(window.contains(-3, 26));
    }
}
