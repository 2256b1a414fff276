// src/processing/mod.rs
//! Signal processing for the breathing waveform

pub mod filter_chain;
pub mod artifact;
pub mod peak_detector;
pub mod pipeline;

pub use filter_chain::*;
pub use artifact::*;
pub use peak_detector::*;
pub use pipeline::*;
