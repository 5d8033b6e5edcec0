//! Session layer: edits, persistence, feedback events

pub mod event;
pub mod hotbar;
pub mod persist;
pub mod session;

pub use event::VoxelEvent;
pub use hotbar::Hotbar;
pub use persist::SavePayload;
pub use session::World;
