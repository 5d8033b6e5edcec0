//! Ray type and slab intersection

use crate::core::types::Vec3;
use super::aabb::Aabb;

/// Direction components smaller than this are treated as parallel to the slab
const PARALLEL_EPSILON: f32 = 1e-8;

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Direction should be normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at distance `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Unclamped slab interval, or None when a parallel axis misses the box.
    fn slab_interval(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if dir.abs() < PARALLEL_EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let t1 = (min - origin) * inv;
            let t2 = (max - origin) * inv;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        Some((t_near, t_far))
    }

    /// Distance at which the ray enters the box from outside.
    ///
    /// Rays that start inside (or on the surface of) the box never enter it,
    /// so this returns None for them.
    pub fn entry_distance(&self, aabb: &Aabb) -> Option<f32> {
        let (t_near, t_far) = self.slab_interval(aabb)?;
        (t_near > 0.0 && t_near <= t_far).then_some(t_near)
    }

    /// True when the ray enters the box strictly before `max_distance`
    pub fn enters_within(&self, aabb: &Aabb, max_distance: f32) -> bool {
        self.entry_distance(aabb).is_some_and(|t| t < max_distance)
    }
}
