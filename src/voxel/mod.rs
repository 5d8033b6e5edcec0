//! Chunk addressing and player edits

pub mod chunk;
pub mod edit;

pub use chunk::{ChunkCoord, GenerationWindow};
pub use edit::{Override, OverrideLog};
