//! Deterministic noise field driving terrain height and feature masks

use ::noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::types::VoxelCoord;
use super::column::ColumnSample;
use super::voxel_type::VoxelType;

/// Frequency, amplitude and seed derivation for one noise feature
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureParams {
    /// Frequency divisor applied to world coordinates
    pub gap: f64,
    /// Multiplier applied to the raw sample
    pub amp: f64,
    /// Sub-seed = master seed * seed_factor
    pub seed_factor: f64,
    /// Mask cutoff; unused for the height feature
    pub threshold: f64,
}

impl FeatureParams {
    pub const fn new(gap: f64, amp: f64, seed_factor: f64, threshold: f64) -> Self {
        Self { gap, amp, seed_factor, threshold }
    }

    /// Sub-seed for this feature
    pub fn seed(&self, master: f64) -> f64 {
        master * self.seed_factor
    }
}

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub height: FeatureParams,
    pub stone: FeatureParams,
    pub coal: FeatureParams,
    pub tree: FeatureParams,
    pub leaf: FeatureParams,
    /// Surface y where the height offset is zero
    pub baseline: i32,
    /// Trunk length above the surface voxel
    pub tree_height: i32,
    /// Offsets below this are sand and never grow trees
    pub lowland_offset: i32,
    /// Half-width of the leaf neighbourhood around a trunk top
    pub leaf_radius: i32,
    /// Depth below the baseline where back-filled voxels are always stone
    pub deep_stone_depth: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            height: FeatureParams::new(22.0, 8.0, 1.0, 0.0),
            stone: FeatureParams::new(12.0, 8.0, 0.4, 3.5),
            coal: FeatureParams::new(3.0, 8.0, 0.5, 3.0),
            tree: FeatureParams::new(2.0, 6.0, 0.7, 4.0),
            leaf: FeatureParams::new(2.0, 5.0, 0.8, -0.03),
            baseline: 30,
            tree_height: 10,
            lowland_offset: -3,
            leaf_radius: 3,
            deep_stone_depth: 7,
        }
    }
}

/// Immutable noise configuration: one master seed plus the feature parameters.
///
/// Every query is a pure function of its arguments, so a field can be cloned
/// into worker threads and sampled concurrently.
#[derive(Clone)]
pub struct NoiseField {
    seed: f64,
    params: TerrainParams,
    perlin: Perlin,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("params", &self.params)
            .finish()
    }
}

impl NoiseField {
    /// Create a field for the given master seed
    pub fn new(seed: f64, params: TerrainParams) -> Self {
        Self {
            seed,
            params,
            // Fixed permutation; the seed selects a slice along the third axis
            perlin: Perlin::new(0),
        }
    }

    /// Master seed
    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// Terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Raw gradient noise in [-1, 1]
    pub fn sample(&self, x: f64, z: f64, seed: f64) -> f64 {
        self.perlin.get([x, z, seed]).clamp(-1.0, 1.0)
    }

    fn feature(&self, feature: &FeatureParams, x: i32, z: i32) -> f64 {
        self.sample(
            x as f64 / feature.gap,
            z as f64 / feature.gap,
            feature.seed(self.seed),
        ) * feature.amp
    }

    /// Surface offset from the baseline
    pub fn height_offset(&self, x: i32, z: i32) -> i32 {
        self.feature(&self.params.height, x, z).floor() as i32
    }

    /// y of the top generated voxel in column (x, z)
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.params.baseline + self.height_offset(x, z)
    }

    pub fn stone_mask(&self, x: i32, z: i32) -> f64 {
        self.feature(&self.params.stone, x, z)
    }

    pub fn coal_mask(&self, x: i32, z: i32) -> f64 {
        self.feature(&self.params.coal, x, z)
    }

    pub fn tree_mask(&self, x: i32, z: i32) -> f64 {
        self.feature(&self.params.tree, x, z)
    }

    pub fn leaf_mask(&self, x: i32, z: i32) -> f64 {
        self.feature(&self.params.leaf, x, z)
    }

    /// Sample everything needed to classify column (x, z)
    pub fn column(&self, x: i32, z: i32) -> ColumnSample {
        let p = &self.params;
        let offset = self.height_offset(x, z);
        let stone = self.stone_mask(x, z) > p.stone.threshold;
        let coal = stone && self.coal_mask(x, z) > p.coal.threshold;
        let has_tree = !stone
            && offset >= p.lowland_offset
            && self.tree_mask(x, z) > p.tree.threshold;

        let surface_type = if coal {
            VoxelType::Coal
        } else if stone {
            VoxelType::Stone
        } else if offset < p.lowland_offset {
            VoxelType::Sand
        } else {
            VoxelType::Grass
        };

        ColumnSample {
            x,
            z,
            offset,
            surface_y: p.baseline + offset,
            surface_type,
            is_stone: stone,
            has_tree,
            tree_height: p.tree_height,
        }
    }

    /// Visit every leaf of the tree rooted in `column`.
    ///
    /// Leaf layers shear the mask along x, so a leaf at vertical offset `j`
    /// samples the mask at `(x + i + j, z + k)`.
    pub fn for_each_leaf(&self, column: &ColumnSample, mut visit: impl FnMut(VoxelCoord)) {
        if !column.has_tree {
            return;
        }
        let r = self.params.leaf_radius;
        let top = column.trunk_top();
        for i in -r..r {
            for j in -r..r {
                for k in -r..r {
                    if i == 0 && k == 0 {
                        continue;
                    }
                    if self.leaf_mask(column.x + i + j, column.z + k) > self.params.leaf.threshold {
                        visit(VoxelCoord::new(column.x + i, top + j, column.z + k));
                    }
                }
            }
        }
    }

    /// True when some tree places a leaf at `coord`
    pub fn leaf_at(&self, coord: VoxelCoord) -> bool {
        let r = self.params.leaf_radius;
        for i in -r..r {
            for k in -r..r {
                if i == 0 && k == 0 {
                    continue;
                }
                let column = self.column(coord.x - i, coord.z - k);
                if !column.has_tree {
                    continue;
                }
                let j = coord.y - column.trunk_top();
                if j < -r || j >= r {
                    continue;
                }
                if self.leaf_mask(coord.x + j, coord.z) > self.params.leaf.threshold {
                    return true;
                }
            }
        }
        false
    }

    /// Procedural voxel at `coord`, ignoring player edits.
    ///
    /// The surface and trunk of a column take precedence over leaves from
    /// neighbouring trees.
    pub fn generated_at(&self, coord: VoxelCoord) -> Option<VoxelType> {
        let column = self.column(coord.x, coord.z);
        if let Some(ty) = column.solid_at(coord.y) {
            return Some(ty);
        }
        self.leaf_at(coord).then_some(VoxelType::Leaf)
    }
}
