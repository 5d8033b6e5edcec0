//! Window generation: noise columns, trunks, leaves, then player overrides.

use std::time::Instant;

use rayon::prelude::*;

use crate::core::types::VoxelCoord;
use crate::terrain::column::ColumnSample;
use crate::terrain::voxel_type::VoxelType;
use crate::voxel::edit::Override;
use super::index_map::CoordinateIndexMap;
use super::instance::InstanceBuffers;
use super::request::{GenerationRequest, GenerationResponse};

/// Builds the instance buffers for a whole window in one pass.
///
/// Never touches the live override log; it reads the request's snapshot.
pub struct ChunkGenerator;

impl ChunkGenerator {
    /// Generate the full window described by `request`
    pub fn generate(request: &GenerationRequest) -> GenerationResponse {
        let start = Instant::now();
        let window = request.window();
        let field = &request.field;
        let width = window.width().max(0) as usize;

        // Phase 1: classify every column, one x row per task
        let columns: Vec<Vec<ColumnSample>> = (window.min_x..window.max_x)
            .into_par_iter()
            .map(|x| (window.min_z..window.max_z).map(|z| field.column(x, z)).collect())
            .collect();

        let column_at = |x: i32, z: i32| -> ColumnSample {
            if window.contains(x, z) {
                columns[(x - window.min_x) as usize][(z - window.min_z) as usize]
            } else {
                field.column(x, z)
            }
        };

        // Phase 2: leaves landing in the window, including from trees just outside it
        let margin = field.params().leaf_radius;
        let outer = window.expanded(margin);
        let leaves: Vec<Vec<VoxelCoord>> = (outer.min_x..outer.max_x)
            .into_par_iter()
            .map(|x| {
                let mut row = Vec::new();
                for z in outer.min_z..outer.max_z {
                    let column = column_at(x, z);
                    field.for_each_leaf(&column, |leaf| {
                        if window.contains(leaf.x, leaf.z) {
                            row.push(leaf);
                        }
                    });
                }
                row
            })
            .collect();

        // Phase 3: sequential merge so slot order is deterministic
        let mut assembler = Assembler {
            buffers: InstanceBuffers::for_budget(request.max_instances(), &request.capacity_factors),
            index_map: CoordinateIndexMap::with_capacity(width * width * 2),
            dropped: 0,
            missed_removals: 0,
        };

        for row in &columns {
            for column in row {
                column.for_each_solid(|coord, ty| assembler.emit(coord, ty));
            }
        }
        for row in &leaves {
            for &leaf in row {
                assembler.emit(leaf, VoxelType::Leaf);
            }
        }

        // Phase 4: fold in player edits
        for entry in request.overrides.in_window(&window) {
            assembler.apply(entry);
        }

        if assembler.dropped > 0 {
            log::warn!(
                "Generation v{} dropped {} instances over capacity",
                request.version, assembler.dropped
            );
        }
        if assembler.missed_removals > 0 {
            log::debug!(
                "Generation v{}: {} removals had no generated voxel",
                request.version, assembler.missed_removals
            );
        }
        log::debug!(
            "Generated window {:?} ({}x{} columns, {} instances) in {:.1}ms",
            request.center,
            width,
            width,
            assembler.index_map.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        GenerationResponse {
            version: request.version,
            center: request.center,
            window,
            index_map: assembler.index_map,
            buffers: assembler.buffers,
            dropped: assembler.dropped,
        }
    }
}

/// Accumulates instances and their index entries during a pass
struct Assembler {
    buffers: InstanceBuffers,
    index_map: CoordinateIndexMap,
    dropped: usize,
    missed_removals: usize,
}

impl Assembler {
    /// First emission at a coordinate wins
    fn emit(&mut self, coord: VoxelCoord, voxel_type: VoxelType) {
        if self.index_map.contains(coord) {
            return;
        }
        match self.buffers.push(voxel_type, coord) {
            Some(slot) => {
                self.index_map.insert(coord, voxel_type, slot);
            }
            None => self.dropped += 1,
        }
    }

    fn apply(&mut self, entry: &Override) {
        let coord = entry.coord();
        let previous = self.index_map.remove(coord);
        if let Some(prev) = previous {
            self.buffers.hide(prev.voxel_type, prev.slot);
        }

        if entry.placed {
            self.emit(coord, entry.voxel_type);
        } else if previous.is_none() {
            self.missed_removals += 1;
        }
    }
}
