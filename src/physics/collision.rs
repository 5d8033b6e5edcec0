//! Six-direction raycast collision against a reconstructed local voxel set

use std::collections::HashMap;

use crate::core::types::{Vec3, VoxelCoord};
use crate::math::{Aabb, Ray};
use crate::terrain::column::ColumnSample;
use crate::terrain::noise::NoiseField;
use crate::voxel::edit::OverrideLog;

/// Candidate arena size; enough for a trunk column plus a handful of edits
const CANDIDATE_CAPACITY: usize = 100;
/// Cached column samples before the cache is reset
const COLUMN_CACHE_LIMIT: usize = 4096;

/// Axis-aligned probe direction. Front is +x, right is +z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit ray direction
    pub fn vector(self) -> Vec3 {
        match self {
            Direction::Front => Vec3::X,
            Direction::Back => Vec3::NEG_X,
            Direction::Left => Vec3::NEG_Z,
            Direction::Right => Vec3::Z,
            Direction::Up => Vec3::Y,
            Direction::Down => Vec3::NEG_Y,
        }
    }

    /// Offset from the observer's column to the probed column
    pub fn column_offset(self) -> (i32, i32) {
        match self {
            Direction::Front => (1, 0),
            Direction::Back => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up | Direction::Down => (0, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        !matches!(self, Direction::Up | Direction::Down)
    }
}

/// One blocked/free flag per direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub front: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl CollisionFlags {
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Front => self.front,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, direction: Direction, value: bool) {
        match direction {
            Direction::Front => self.front = value,
            Direction::Back => self.back = value,
            Direction::Left => self.left = value,
            Direction::Right => self.right = value,
            Direction::Up => self.up = value,
            Direction::Down => self.down = value,
        }
    }
}

/// Round half up, so -2.5 maps to -2 like the column grid expects
pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Per-tick collision tester.
///
/// Holds a reusable candidate arena and a cache of column samples so that
/// repeated probes over the same ground do not resample noise.
pub struct CollisionProbe {
    /// Ray length for horizontal probes (body width)
    horizontal_reach: f32,
    /// Ray length for the upward probe
    up_reach: f32,
    /// How far below the reference point the lower and upward rays start
    lower_offset: f32,
    candidates: Vec<VoxelCoord>,
    columns: HashMap<(i32, i32), ColumnSample>,
    /// Seed bits the cache was filled with
    cache_seed: Option<u64>,
}

impl CollisionProbe {
    pub fn new(horizontal_reach: f32, up_reach: f32) -> Self {
        Self {
            horizontal_reach,
            up_reach,
            lower_offset: 1.0,
            candidates: Vec::with_capacity(CANDIDATE_CAPACITY),
            columns: HashMap::with_capacity(256),
            cache_seed: None,
        }
    }

    fn column(&mut self, field: &NoiseField, x: i32, z: i32) -> ColumnSample {
        let seed_bits = field.seed().to_bits();
        if self.cache_seed != Some(seed_bits) || self.columns.len() >= COLUMN_CACHE_LIMIT {
            self.columns.clear();
            self.cache_seed = Some(seed_bits);
        }
        *self.columns.entry((x, z)).or_insert_with(|| field.column(x, z))
    }

    /// Drop cached columns (e.g. after switching worlds)
    pub fn reset_cache(&mut self) {
        self.columns.clear();
        self.cache_seed = None;
    }

    /// Voxels the observer could touch when moving in `direction`
    fn gather(
        &mut self,
        direction: Direction,
        position: Vec3,
        sneaking: bool,
        field: &NoiseField,
        overrides: &OverrideLog,
    ) {
        let (dx, dz) = direction.column_offset();
        let x = round_half_up(position.x) + dx;
        let z = round_half_up(position.z) + dz;
        let column = self.column(field, x, z);

        self.candidates.clear();
        for entry in overrides.column(x, z) {
            if entry.placed {
                self.candidates.push(entry.coord());
            }
        }

        let suppressed = |coord: VoxelCoord| overrides.resolve(coord).is_some_and(|e| !e.placed);

        let surface = column.surface();
        if !suppressed(surface) {
            self.candidates.push(surface);
        }
        for layer in column.trunk_layers() {
            let coord = VoxelCoord::new(x, column.surface_y + layer, z);
            if !suppressed(coord) {
                self.candidates.push(coord);
            }
        }

        // Virtual step at foot level keeps a crouching observer on the ledge
        if sneaking && direction.is_horizontal() && column.surface_y < (position.y - 2.0).floor() as i32 {
            self.candidates.push(VoxelCoord::new(x, (position.y - 1.0).floor() as i32, z));
        }
    }

    /// Test one direction. `down_reach` is only used for `Direction::Down`.
    pub fn probe(
        &mut self,
        direction: Direction,
        position: Vec3,
        down_reach: f32,
        sneaking: bool,
        field: &NoiseField,
        overrides: &OverrideLog,
    ) -> bool {
        self.gather(direction, position, sneaking, field, overrides);
        if self.candidates.is_empty() {
            return false;
        }

        let both = [position, position - Vec3::Y * self.lower_offset];
        let dir = direction.vector();
        let (origins, reach) = match direction {
            Direction::Down => (&both[..1], down_reach),
            Direction::Up => (&both[1..], self.up_reach),
            _ => (&both[..], self.horizontal_reach),
        };
        if reach <= 0.0 {
            return false;
        }

        origins.iter().any(|&origin| {
            let ray = Ray::new(origin, dir);
            self.candidates
                .iter()
                .any(|&coord| ray.enters_within(&Aabb::voxel(coord), reach))
        })
    }

    /// Test all six directions at `position`
    pub fn probe_all(
        &mut self,
        position: Vec3,
        down_reach: f32,
        sneaking: bool,
        field: &NoiseField,
        overrides: &OverrideLog,
    ) -> CollisionFlags {
        let mut flags = CollisionFlags::default();
        for direction in Direction::ALL {
            let hit = self.probe(direction, position, down_reach, sneaking, field, overrides);
            flags.set(direction, hit);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::noise::TerrainParams;
    use crate::terrain::voxel_type::VoxelType;

    const REACH: f32 = 1.8;

    fn probe() -> CollisionProbe {
        CollisionProbe::new(0.5, 1.2)
    }

    fn plain_field() -> NoiseField {
        NoiseField::new(0.61, TerrainParams::default())
    }

    fn wooded_field() -> NoiseField {
        let mut params = TerrainParams::default();
        params.tree.threshold = 0.5;
        NoiseField::new(0.61, params)
    }

    /// Column whose four neighbours share its height and carry no trees
    fn flat_column(field: &NoiseField) -> (i32, i32, i32) {
        for x in -200..200 {
            for z in -200..200 {
                let c = field.column(x, z);
                let flat = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)].iter().all(|(dx, dz)| {
                    let n = field.column(x + dx, z + dz);
                    n.surface_y == c.surface_y && !n.has_tree
                });
                if flat {
                    return (x, c.surface_y, z);
                }
            }
        }
        panic!("no flat column found");
    }

    fn tree_column(field: &NoiseField) -> ColumnSample {
        for x in -200..200 {
            for z in -200..200 {
                let c = field.column(x, z);
                if c.has_tree && !field.column(x - 1, z).has_tree {
                    return c;
                }
            }
        }
        panic!("no tree column found");
    }

    #[test]
    fn test_flat_ground() {
        let field = plain_field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let pos = Vec3::new(x as f32, s as f32 + 1.0, z as f32);

        let flags = probe().probe_all(pos, REACH, false, &field, &log);
        assert!(flags.down);
        assert!(!flags.up);
        assert!(!flags.front);
        assert!(!flags.back);
        assert!(!flags.left);
        assert!(!flags.right);
    }

    #[test]
    fn test_free_fall_high_above() {
        let field = plain_field();
        let log = OverrideLog::new();
        let flags = probe().probe_all(Vec3::new(3.0, 200.0, 3.0), REACH, false, &field, &log);
        assert_eq!(flags, CollisionFlags::default());
    }

    #[test]
    fn test_removed_surface_opens_hole() {
        let field = plain_field();
        let (x, s, z) = flat_column(&field);
        let mut log = OverrideLog::new();
        log.record_removal(VoxelCoord::new(x, s, z), VoxelType::Grass);

        let pos = Vec3::new(x as f32, s as f32 + 1.0, z as f32);
        assert!(!probe().probe(Direction::Down, pos, REACH, false, &field, &log));
    }

    #[test]
    fn test_placed_wall_blocks_front() {
        let field = plain_field();
        let (x, s, z) = flat_column(&field);
        let mut log = OverrideLog::new();
        log.record_placement(VoxelCoord::new(x + 1, s + 1, z), VoxelType::Stone);

        let pos = Vec3::new(x as f32 + 0.1, s as f32 + 1.0, z as f32);
        let mut p = probe();
        assert!(p.probe(Direction::Front, pos, REACH, false, &field, &log));
        assert!(!p.probe(Direction::Back, pos, REACH, false, &field, &log));
    }

    #[test]
    fn test_trunk_blocks_until_removed() {
        let field = wooded_field();
        let tree = tree_column(&field);
        let pos = Vec3::new(tree.x as f32 - 0.9, (tree.surface_y + 3) as f32, tree.z as f32);

        let mut log = OverrideLog::new();
        let mut p = probe();
        assert!(p.probe(Direction::Front, pos, REACH, false, &field, &log));

        for layer in [2, 3] {
            log.record_removal(VoxelCoord::new(tree.x, tree.surface_y + layer, tree.z), VoxelType::Tree);
        }
        assert!(!p.probe(Direction::Front, pos, REACH, false, &field, &log));
    }

    #[test]
    fn test_sneak_step_on_ledge() {
        let field = plain_field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let pos = Vec3::new(x as f32 + 0.1, s as f32 + 10.0, z as f32);

        let mut p = probe();
        assert!(!p.probe(Direction::Front, pos, REACH, false, &field, &log));
        assert!(p.probe(Direction::Front, pos, REACH, true, &field, &log));
        // Vertical probes never get the step
        assert!(!p.probe(Direction::Up, pos, REACH, true, &field, &log));
    }

    #[test]
    fn test_zero_down_reach_never_hits() {
        let field = plain_field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let pos = Vec3::new(x as f32, s as f32 + 1.0, z as f32);
        assert!(!probe().probe(Direction::Down, pos, 0.0, false, &field, &log));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn test_flags_get_set() {
        let mut flags = CollisionFlags::default();
        for dir in Direction::ALL {
            assert!(!flags.get(dir));
            flags.set(dir, true);
            assert!(flags.get(dir));
        }
    }
}
