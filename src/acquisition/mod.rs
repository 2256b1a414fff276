// src/acquisition/mod.rs
//! Bounded buffers feeding external consumers

pub mod ring_buffer;
pub mod telemetry;
pub mod burst;

pub use ring_buffer::*;
pub use telemetry::*;
pub use burst::*;
