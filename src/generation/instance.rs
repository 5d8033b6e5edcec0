//! Per-type instance transform buffers handed to the renderer

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::core::types::VoxelCoord;
use crate::terrain::voxel_type::VoxelType;

/// Column-major 4x4 transform of one voxel instance - 64 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    pub cols: [f32; 16],
}

impl InstanceTransform {
    /// All-zero matrix; collapses the instance to a point so it draws nothing
    pub const HIDDEN: Self = Self { cols: [0.0; 16] };

    /// Translation to the centre of voxel `coord`
    pub fn translation(coord: VoxelCoord) -> Self {
        Self {
            cols: Mat4::from_translation(coord.as_vec3()).to_cols_array(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.cols.iter().all(|v| *v == 0.0)
    }

    /// Voxel coordinate encoded in the translation column, None when hidden
    pub fn coord(&self) -> Option<VoxelCoord> {
        if self.is_hidden() {
            return None;
        }
        Some(VoxelCoord::new(
            self.cols[12].round() as i32,
            self.cols[13].round() as i32,
            self.cols[14].round() as i32,
        ))
    }
}

/// Fixed-capacity array of transforms for one voxel type.
///
/// The buffer never shrinks; removed instances are hidden in place.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    voxel_type: VoxelType,
    transforms: Vec<InstanceTransform>,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(voxel_type: VoxelType, capacity: usize) -> Self {
        Self {
            voxel_type,
            transforms: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn voxel_type(&self) -> VoxelType {
        self.voxel_type
    }

    /// Append an instance; None when the buffer is full
    pub fn push(&mut self, coord: VoxelCoord) -> Option<u32> {
        if self.transforms.len() >= self.capacity {
            return None;
        }
        let slot = self.transforms.len() as u32;
        self.transforms.push(InstanceTransform::translation(coord));
        Some(slot)
    }

    /// Zero the transform at `slot`. Returns false for out-of-range slots.
    pub fn hide(&mut self, slot: u32) -> bool {
        match self.transforms.get_mut(slot as usize) {
            Some(t) => {
                *t = InstanceTransform::HIDDEN;
                true
            }
            None => false,
        }
    }

    /// Live count, hidden instances included
    pub fn count(&self) -> usize {
        self.transforms.len()
    }

    /// Instances not hidden
    pub fn visible_count(&self) -> usize {
        self.transforms.iter().filter(|t| !t.is_hidden()).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Raw bytes of the live transforms for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }
}

/// One buffer per voxel type, indexed by `VoxelType::index`
#[derive(Clone, Debug)]
pub struct InstanceBuffers {
    buffers: Vec<InstanceBuffer>,
}

impl InstanceBuffers {
    /// Split `max_instances` across types by `factors`
    pub fn for_budget(max_instances: usize, factors: &[f32; VoxelType::COUNT]) -> Self {
        let buffers = VoxelType::ALL
            .iter()
            .map(|&ty| {
                let capacity = (max_instances as f64 * factors[ty.index()] as f64).floor() as usize;
                InstanceBuffer::new(ty, capacity)
            })
            .collect();
        Self { buffers }
    }

    pub fn get(&self, voxel_type: VoxelType) -> &InstanceBuffer {
        &self.buffers[voxel_type.index()]
    }

    pub fn push(&mut self, voxel_type: VoxelType, coord: VoxelCoord) -> Option<u32> {
        self.buffers[voxel_type.index()].push(coord)
    }

    pub fn hide(&mut self, voxel_type: VoxelType, slot: u32) -> bool {
        self.buffers[voxel_type.index()].hide(slot)
    }

    /// Live count per type
    pub fn counts(&self) -> [usize; VoxelType::COUNT] {
        let mut counts = [0; VoxelType::COUNT];
        for (count, buffer) in counts.iter_mut().zip(&self.buffers) {
            *count = buffer.count();
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceBuffer> {
        self.buffers.iter()
    }
}
