// src/config/constants.rs
//! System-wide configuration constants
//!
//! Defaults are the neonatal tuning used on the bedside unit: a 100 Hz
//! processing rate, a 12-bit converter at its most sensitive gain and the
//! clinical apnea/hypopnea durations.

/// Signal acquisition constants
pub mod signal {
    pub const DEFAULT_PROCESSING_RATE_HZ: u32 = 100;
    pub const MIN_PROCESSING_RATE_HZ: u32 = 1;
    pub const CHANNEL_COUNT: usize = 2;
    pub const DEFAULT_CHANNEL1_INDEX: u8 = 0;
    pub const DEFAULT_CHANNEL2_INDEX: u8 = 1;

    // Signed code span for one full-scale excursion
    pub const ADS1015_COUNTS_PER_FULL_SCALE: f32 = 2048.0;
    pub const ADS1115_COUNTS_PER_FULL_SCALE: f32 = 32768.0;
}

/// Filter chain and threshold tracker constants
pub mod filters {
    pub const DEFAULT_BASELINE_TAU_SEC: f32 = 5.0;
    pub const DEFAULT_ANTI_RING_TAPS: u8 = 3;
    pub const MIN_ANTI_RING_TAPS: u8 = 1;
    pub const MAX_ANTI_RING_TAPS: u8 = 8;
    pub const DEFAULT_ENVELOPE_TAU_SEC: f32 = 0.3;
    pub const DEFAULT_THRESHOLD_TAU_SEC: f32 = 60.0;
    pub const DEFAULT_THRESHOLD_FACTOR: f32 = 0.45;

    /// Per-tick multiplicative release of the envelope baseline
    pub const BASELINE_DECAY_PER_TICK: f32 = 0.9995;
    /// Baseline never releases below this fraction of the live envelope
    pub const BASELINE_FLOOR_FRACTION: f32 = 0.9;
    /// Guards every division by the envelope baseline
    pub const ENVELOPE_EPSILON: f32 = 1e-6;
}

/// Peak and rate detection constants
pub mod peaks {
    pub const DEFAULT_MIN_PEAK_DISTANCE_SEC: f32 = 0.6;
    pub const DEFAULT_REFRACTORY_SEC: f32 = 0.4;
    pub const RATE_WINDOW_LEN: usize = 6;

    // 300 and 6 breaths per minute
    pub const MIN_IBI_SEC: f32 = 0.2;
    pub const MAX_IBI_SEC: f32 = 10.0;
}

/// Apnea / hypopnea episode constants
pub mod episodes {
    pub const DEFAULT_HYPOPNEA_FRACTION: f32 = 0.5;
    pub const DEFAULT_HYPOPNEA_MIN_SEC: f32 = 10.0;
    pub const DEFAULT_APNEA_MIN_SEC: f32 = 20.0;
    pub const DEFAULT_RECOVERY_MIN_SEC: f32 = 3.0;
    pub const DEFAULT_SIGNAL_OK_WINDOW_MS: u32 = 2000;
    pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 32;
}

/// Artifact rejection constants
pub mod artifact {
    pub const DEFAULT_RAIL_MARGIN_MV: f32 = 2.0;
    pub const DEFAULT_SPIKE_DERIV_MV: f32 = 30.0;
    pub const DEFAULT_RMS_BURST_FACTOR: f32 = 3.0;
}

/// Telemetry and diagnostic buffer constants
pub mod buffers {
    pub const DEFAULT_TELEMETRY_CAPACITY: usize = 256;
    pub const MIN_TELEMETRY_CAPACITY: usize = 1;
    pub const DEFAULT_BURST_PRE_MS: u32 = 3000;
    pub const DEFAULT_BURST_POST_MS: u32 = 3000;
    pub const MIN_BURST_CAPACITY: usize = 64;
    pub const MAX_BURST_CAPACITY: usize = 16_000;
}

/// Timing constants
pub mod time {
    pub const NANOSECONDS_PER_SECOND: u64 = 1_000_000_000;
    pub const NANOSECONDS_PER_MILLISECOND: u64 = 1_000_000;
    pub const MILLISECONDS_PER_SECOND: u64 = 1_000;
}

/// Configuration file discovery
pub mod paths {
    pub const DEFAULT_CONFIG_FILES: &[&str] = &["breath.toml", "config/breath.toml"];
    pub const ENV_PREFIX: &str = "BREATH";
}
