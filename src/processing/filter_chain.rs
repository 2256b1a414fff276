// src/processing/filter_chain.rs
//! Per-channel filter chain and adaptive threshold tracker
//!
//! Each tick a millivolt sample goes through:
//! 1. DC baseline removal (slow EMA)
//! 2. Anti-ring moving average over the filled taps
//! 3. Full-wave rectification
//! 4. Envelope EMA
//!
//! The envelope then feeds a peak-following baseline with fast attack and slow
//! multiplicative release. The detection threshold is a fraction of that baseline.

use crate::acquisition::ring_buffer::Ring;
use crate::config::constants::filters;
use crate::config::DerivedCoefficients;

/// Filter memory and detection history owned by one physical channel
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub dc_baseline: f32,
    taps: Ring<f32>,
    pub env: f32,
    pub env_baseline: f32,
    pub last_env_peak: f32,
    pub last_peak_ms: Option<u64>,
    /// Last tick the envelope was above threshold and artifact-free
    pub last_cross_ms: u64,

    // Edge and artifact history, kept per channel
    pub prev_env: f32,
    pub prev_above: bool,
    pub prev_artifact: bool,
    pub last_accepted_ms: Option<u64>,
}

impl ChannelState {
    pub fn new(taps: usize) -> Self {
        Self {
            dc_baseline: 0.0,
            taps: Ring::new(taps),
            env: 0.0,
            env_baseline: 0.0,
            last_env_peak: 0.0,
            last_peak_ms: None,
            last_cross_ms: 0,
            prev_env: 0.0,
            prev_above: false,
            prev_artifact: false,
            last_accepted_ms: None,
        }
    }

    /// Run one sample through the chain and update the threshold tracker
    pub fn process(&mut self, x_mv: f32, coeffs: &DerivedCoefficients) {
        let x_mv = if x_mv.is_finite() { x_mv } else { 0.0 };

        self.dc_baseline += coeffs.alpha_dc * (x_mv - self.dc_baseline);
        let detrended = x_mv - self.dc_baseline;

        self.taps.push(detrended);
        let mean = self.taps.iter().sum::<f32>() / self.taps.len() as f32;

        let rectified = mean.abs();
        self.env += coeffs.alpha_env * (rectified - self.env);

        self.track_baseline(coeffs.alpha_thr);
    }

    fn track_baseline(&mut self, alpha_thr: f32) {
        if self.env > self.env_baseline {
            self.env_baseline += alpha_thr * (self.env - self.env_baseline);
            self.last_env_peak = self.env;
        } else {
            let released = self.env_baseline * filters::BASELINE_DECAY_PER_TICK;
            self.env_baseline = released.max(self.env * filters::BASELINE_FLOOR_FRACTION);
        }
    }

    /// Baseline guarded against division by zero
    pub fn guarded_baseline(&self) -> f32 {
        self.env_baseline.max(filters::ENVELOPE_EPSILON)
    }

    /// Effective detection threshold
    pub fn threshold(&self, factor: f32) -> f32 {
        factor * self.guarded_baseline()
    }

    /// Envelope relative to its baseline; zero until a baseline exists
    pub fn snr(&self) -> f32 {
        if self.env_baseline > filters::ENVELOPE_EPSILON {
            self.env / self.env_baseline
        } else {
            0.0
        }
    }

    /// Number of anti-ring taps currently configured
    pub fn tap_count(&self) -> usize {
        self.taps.capacity()
    }

    /// Re-size the anti-ring buffer, keeping the newest taps
    pub fn set_tap_count(&mut self, taps: usize) {
        self.taps.resize(taps);
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(filters::DEFAULT_ANTI_RING_TAPS as usize)
    }
}
