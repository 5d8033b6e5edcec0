//! Off-thread generation streaming

pub mod worker;

pub use worker::GenerationWorker;
