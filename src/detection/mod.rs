// src/detection/mod.rs
//! Apnea and hypopnea episode detection

pub mod events;
pub mod apnea;
pub mod hypopnea;

pub use events::*;
pub use apnea::ApneaDetector;
pub use hypopnea::HypopneaDetector;

use serde::{Deserialize, Serialize};

/// State shared by both episode machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodeState {
    #[default]
    Idle,
    Active,
}
