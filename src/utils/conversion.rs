//! Conversion utilities for breath-core
//!
//! Provides the conversions shared by the filter chain, the artifact detector
//! and the simulator:
//! - ADC counts to millivolts and back
//! - Full-scale rail for a gain setting
//! - EMA smoothing factor from a time constant
//!
//! All conversions are total: out-of-range inputs clamp instead of failing so
//! they can run inside the sampling loop.

use crate::hal::types::{AdcGain, AdcModel};

/// Millivolts represented by one converter code
pub fn lsb_millivolts(model: AdcModel, gain: AdcGain) -> f32 {
    gain.full_scale_mv() / model.counts_per_full_scale()
}

/// Saturation rail in millivolts for a gain setting
pub fn rail_millivolts(gain: AdcGain) -> f32 {
    gain.full_scale_mv()
}

/// Convert a raw converter reading to millivolts
pub fn counts_to_millivolts(counts: i16, lsb_mv: f32) -> f32 {
    counts as f32 * lsb_mv
}

/// Convert millivolts to the nearest converter code, saturating at the code range
pub fn millivolts_to_counts(millivolts: f32, lsb_mv: f32) -> i16 {
    if lsb_mv <= 0.0 || !millivolts.is_finite() {
        return 0;
    }
    let counts = (millivolts / lsb_mv).round();
    counts.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// EMA factor `1 - e^(-dt/tau)` for a time constant at a processing rate
///
/// A non-positive time constant disables smoothing (factor 1).
pub fn alpha_from_tau(tau_sec: f32, rate_hz: u32) -> f32 {
    if tau_sec <= 0.0 {
        return 1.0;
    }
    let dt = 1.0 / rate_hz.max(1) as f32;
    1.0 - (-dt / tau_sec).exp()
}

/// Convert seconds to the nearest whole millisecond, treating negative values as zero
pub fn seconds_to_millis(seconds: f32) -> u64 {
    if seconds <= 0.0 || !seconds.is_finite() {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}
