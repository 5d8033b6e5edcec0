//! Player edits recorded as overrides over generated terrain.

pub mod log;

pub use log::{Override, OverrideLog};
