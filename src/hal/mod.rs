// src/hal/mod.rs
//! Hardware abstraction for the breathing sensor front end

pub mod traits;
pub mod types;
pub mod simulator;

pub use traits::*;
pub use types::*;
pub use simulator::{BreathSimulator, ScriptStep, Segment, SimulatorConfig};
