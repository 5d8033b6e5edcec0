//! Window generation pipeline - builds per-type instance buffers.
//!
//! A pass runs in four phases:
//! 1. Column classification (surface height, stone/coal, tree gate)
//! 2. Leaf placement around trunk tops
//! 3. Deterministic merge into instance buffers and the coordinate index
//! 4. Player overrides folded over the result

pub mod instance;
pub mod index_map;
pub mod request;
pub mod chunk_gen;

pub use instance::{InstanceBuffer, InstanceBuffers, InstanceTransform};
pub use index_map::{CoordinateIndexMap, IndexEntry};
pub use request::{GenerationRequest, GenerationResponse};
pub use chunk_gen::ChunkGenerator;
