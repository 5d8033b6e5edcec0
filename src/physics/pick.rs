//! Target picking: the voxel under the crosshair and the face it was hit on

use crate::core::types::{IVec3, Vec3, VoxelCoord};
use crate::math::{Aabb, Ray};
use crate::terrain::noise::NoiseField;
use crate::voxel::edit::OverrideLog;

/// Voxel hit by a pick ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub coord: VoxelCoord,
    /// Outward normal of the face the ray entered through
    pub normal: IVec3,
    pub distance: f32,
}

impl PickHit {
    /// Empty cell in front of the hit face, where a placement lands
    pub fn adjacent(&self) -> VoxelCoord {
        self.coord + self.normal
    }
}

/// Nearest solid voxel along `direction` from `eye` within `reach`.
///
/// Considers surface and trunk voxels that have not been removed plus placed
/// voxels, in every column within `reach` of the eye. Leaves are not pickable.
pub fn pick(eye: Vec3, direction: Vec3, reach: f32, field: &NoiseField, overrides: &OverrideLog) -> Option<PickHit> {
    let direction = direction.try_normalize()?;
    if reach <= 0.0 {
        return None;
    }
    let ray = Ray::new(eye, direction);
    let radius = reach.ceil() as i32;
    let cx = (eye.x + 0.5).floor() as i32;
    let cz = (eye.z + 0.5).floor() as i32;

    let mut best: Option<(f32, VoxelCoord)> = None;
    let mut test = |coord: VoxelCoord| {
        if let Some(t) = ray.entry_distance(&Aabb::voxel(coord)) {
            if t < reach && best.is_none_or(|(bt, _)| t < bt) {
                best = Some((t, coord));
            }
        }
    };

    for x in cx - radius..=cx + radius {
        for z in cz - radius..=cz + radius {
            for entry in overrides.column(x, z) {
                if entry.placed {
                    test(entry.coord());
                }
            }
            let column = field.column(x, z);
            column.for_each_solid(|coord, _| {
                if !overrides.resolve(coord).is_some_and(|e| !e.placed) {
                    test(coord);
                }
            });
        }
    }

    let (distance, coord) = best?;
    Some(PickHit {
        coord,
        normal: Aabb::voxel(coord).face_normal(ray.at(distance)),
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::noise::TerrainParams;
    use crate::terrain::voxel_type::VoxelType;

    fn field() -> NoiseField {
        NoiseField::new(0.61, TerrainParams::default())
    }

    #[test]
    fn test_pick_surface_below() {
        let field = field();
        let log = OverrideLog::new();
        let s = field.surface_height(4, 4);
        let eye = Vec3::new(4.0, s as f32 + 2.0, 4.0);

        let hit = pick(eye, Vec3::NEG_Y, 8.0, &field, &log).unwrap();
        assert_eq!(hit.coord, VoxelCoord::new(4, s, 4));
        assert_eq!(hit.normal, IVec3::Y);
        assert_eq!(hit.adjacent(), VoxelCoord::new(4, s + 1, 4));
        assert!((hit.distance - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_pick_out_of_reach() {
        let field = field();
        let log = OverrideLog::new();
        let eye = Vec3::new(4.0, 200.0, 4.0);
        assert!(pick(eye, Vec3::NEG_Y, 8.0, &field, &log).is_none());
    }

    #[test]
    fn test_pick_sees_placed_and_skips_removed() {
        let field = field();
        let s = field.surface_height(0, 0);
        let eye = Vec3::new(0.0, s as f32 + 3.0, 0.0);
        let mut log = OverrideLog::new();

        let placed = VoxelCoord::new(1, s + 3, 0);
        log.record_placement(placed, VoxelType::Glass);
        let hit = pick(eye, Vec3::X, 8.0, &field, &log).unwrap();
        assert_eq!(hit.coord, placed);
        assert_eq!(hit.normal, IVec3::NEG_X);

        log.record_removal(VoxelCoord::new(0, s, 0), field.column(0, 0).surface_type);
        let below = pick(eye, Vec3::NEG_Y, 8.0, &field, &log);
        assert!(below.is_none_or(|h| h.coord != VoxelCoord::new(0, s, 0)));
    }

    #[test]
    fn test_zero_direction() {
        let field = field();
        let log = OverrideLog::new();
        assert!(pick(Vec3::ZERO, Vec3::ZERO, 8.0, &field, &log).is_none());
    }
}
