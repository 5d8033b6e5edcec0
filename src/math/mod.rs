//! Geometry helpers for voxel picking and collision

pub mod aabb;
pub mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
