//! Axis-aligned boxes for voxel cells

use crate::core::types::{IVec3, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Unit cube of the voxel at `coord`, centred on the integer point
    pub fn voxel(coord: IVec3) -> Self {
        let center = coord.as_vec3();
        Self::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Outward normal of the face nearest to `point` (a point on the surface)
    pub fn face_normal(&self, point: Vec3) -> IVec3 {
        let local = (point - self.center()) / (self.max - self.min);
        let abs = local.abs();
        if abs.x >= abs.y && abs.x >= abs.z {
            IVec3::new(sign(local.x), 0, 0)
        } else if abs.y >= abs.z {
            IVec3::new(0, sign(local.y), 0)
        } else {
            IVec3::new(0, 0, sign(local.z))
        }
    }
}

fn sign(v: f32) -> i32 {
    if v < 0.0 { -1 } else { 1 }
}
