//! Observer physics: collision probing, movement and target picking

pub mod collision;
pub mod movement;
pub mod pick;

pub use collision::{round_half_up, CollisionFlags, CollisionProbe, Direction};
pub use movement::{Mode, MovementConfig, MovementInput, MovementIntegrator, ObserverState};
pub use pick::{pick, PickHit};
