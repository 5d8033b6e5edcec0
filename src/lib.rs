//! Voxterra - infinite editable voxel terrain streamed around a moving observer

pub mod core;
pub mod math;
pub mod terrain;
pub mod voxel;
pub mod generation;
pub mod streaming;
pub mod physics;
pub mod world;
