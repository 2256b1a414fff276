//! Breath-Core: real-time neonatal breathing waveform engine
//!
//! This library turns raw converter counts from two piezo breathing sensors
//! into a breath rate, apnea and hypopnea episodes, and artifact flags. It
//! runs forever on constant memory and never blocks. It features:
//!
//! - Per-channel DC removal, anti-ring smoothing and envelope extraction
//! - Adaptive peak-following threshold with artifact rejection
//! - Debounced breath detection with a median-of-six rate estimate
//! - Edge-triggered apnea and hypopnea state machines
//! - Lossy telemetry ring and always-on diagnostic burst recorder
//! - Layered TOML/environment configuration
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use breath_core::{BreathPipeline, BreathSimulator, PipelineConfig, TickPacer, TimeProvider};
//! use breath_core::utils::MonotonicTimeProvider;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let mut pipeline = BreathPipeline::new(config.clone());
//!     pipeline.attach_source(Box::new(BreathSimulator::breathing(40.0, 80.0)))?;
//!     pipeline.set_event_callback(|event| println!("{:?}", event));
//!
//!     let clock = MonotonicTimeProvider::new();
//!     let mut pacer = TickPacer::new(config.processing_rate_hz, clock.now_nanos());
//!     loop {
//!         if pacer.poll(clock.now_nanos()) {
//!             pipeline.tick();
//!         }
//!         while let Some(record) = pipeline.pop_telemetry() {
//!             println!("{:.1} bpm", record.bpm);
//!         }
//!     }
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod detection;
pub mod error;
pub mod hal;
pub mod processing;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{BurstSample, TelemetryRecord};
pub use config::{ConfigError, ConfigLoader, DerivedCoefficients, PipelineConfig};
pub use detection::{EpisodeState, Event, EventListener, EventQueue, EventType};
pub use error::{BreathError, BreathResult, SourceError};
pub use hal::{AdcGain, AdcModel, BreathSimulator, FnSource, PrimaryChannel, RawFrame, SampleSource};
pub use processing::{ArtifactFlags, BreathPipeline, PipelineMetrics, Status};
pub use utils::time::{TickPacer, TimeProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Real-time neonatal breathing waveform engine".to_string(),
        features: vec![
            "Adaptive envelope filter chain".to_string(),
            "Median breath-rate estimate".to_string(),
            "Apnea and hypopnea detection".to_string(),
            "Artifact rejection".to_string(),
            "Telemetry and diagnostic burst rings".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
