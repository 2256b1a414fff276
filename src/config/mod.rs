// src/config/mod.rs
//! Pipeline configuration and derived filter coefficients

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::hal::{AdcGain, AdcModel, PrimaryChannel};
use crate::utils::conversion::{alpha_from_tau, lsb_millivolts, rail_millivolts, seconds_to_millis};
use serde::{Deserialize, Serialize};

/// Tuning record for the breathing engine
///
/// Every field has a default so partial TOML files and environment overrides
/// are accepted. Out-of-range values are never rejected; [`PipelineConfig::sanitized`]
/// clamps them to safe minimums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub processing_rate_hz: u32,
    pub adc_model: AdcModel,
    pub adc_gain: AdcGain,
    pub channel1_index: u8,
    pub channel2_index: u8,
    pub primary_channel: PrimaryChannel,

    pub baseline_tau_sec: f32,
    pub anti_ring_taps: u8,
    pub envelope_tau_sec: f32,
    pub threshold_tau_sec: f32,
    pub threshold_factor: f32,

    pub min_peak_distance_sec: f32,
    pub refractory_sec: f32,

    pub hypopnea_frac: f32,
    pub hypopnea_min_sec: f32,
    pub apnea_min_sec: f32,
    /// Reserved; not consulted. Apnea ends on the first valid threshold crossing.
    pub recovery_min_sec: f32,
    pub signal_ok_window_ms: u32,

    pub rail_margin_mv: f32,
    pub spike_deriv_mv: f32,
    pub rms_burst_factor: f32,

    pub burst_pre_ms: u32,
    pub burst_post_ms: u32,
    pub telemetry_capacity: usize,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn processing_rate_hz() -> u32 { signal::DEFAULT_PROCESSING_RATE_HZ }
    pub fn channel1_index() -> u8 { signal::DEFAULT_CHANNEL1_INDEX }
    pub fn channel2_index() -> u8 { signal::DEFAULT_CHANNEL2_INDEX }

    pub fn baseline_tau_sec() -> f32 { filters::DEFAULT_BASELINE_TAU_SEC }
    pub fn anti_ring_taps() -> u8 { filters::DEFAULT_ANTI_RING_TAPS }
    pub fn envelope_tau_sec() -> f32 { filters::DEFAULT_ENVELOPE_TAU_SEC }
    pub fn threshold_tau_sec() -> f32 { filters::DEFAULT_THRESHOLD_TAU_SEC }
    pub fn threshold_factor() -> f32 { filters::DEFAULT_THRESHOLD_FACTOR }

    pub fn min_peak_distance_sec() -> f32 { peaks::DEFAULT_MIN_PEAK_DISTANCE_SEC }
    pub fn refractory_sec() -> f32 { peaks::DEFAULT_REFRACTORY_SEC }

    pub fn hypopnea_frac() -> f32 { episodes::DEFAULT_HYPOPNEA_FRACTION }
    pub fn hypopnea_min_sec() -> f32 { episodes::DEFAULT_HYPOPNEA_MIN_SEC }
    pub fn apnea_min_sec() -> f32 { episodes::DEFAULT_APNEA_MIN_SEC }
    pub fn recovery_min_sec() -> f32 { episodes::DEFAULT_RECOVERY_MIN_SEC }
    pub fn signal_ok_window_ms() -> u32 { episodes::DEFAULT_SIGNAL_OK_WINDOW_MS }

    pub fn rail_margin_mv() -> f32 { artifact::DEFAULT_RAIL_MARGIN_MV }
    pub fn spike_deriv_mv() -> f32 { artifact::DEFAULT_SPIKE_DERIV_MV }
    pub fn rms_burst_factor() -> f32 { artifact::DEFAULT_RMS_BURST_FACTOR }

    pub fn burst_pre_ms() -> u32 { buffers::DEFAULT_BURST_PRE_MS }
    pub fn burst_post_ms() -> u32 { buffers::DEFAULT_BURST_POST_MS }
    pub fn telemetry_capacity() -> usize { buffers::DEFAULT_TELEMETRY_CAPACITY }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            processing_rate_hz: defaults::processing_rate_hz(),
            adc_model: AdcModel::default(),
            adc_gain: AdcGain::default(),
            channel1_index: defaults::channel1_index(),
            channel2_index: defaults::channel2_index(),
            primary_channel: PrimaryChannel::default(),
            baseline_tau_sec: defaults::baseline_tau_sec(),
            anti_ring_taps: defaults::anti_ring_taps(),
            envelope_tau_sec: defaults::envelope_tau_sec(),
            threshold_tau_sec: defaults::threshold_tau_sec(),
            threshold_factor: defaults::threshold_factor(),
            min_peak_distance_sec: defaults::min_peak_distance_sec(),
            refractory_sec: defaults::refractory_sec(),
            hypopnea_frac: defaults::hypopnea_frac(),
            hypopnea_min_sec: defaults::hypopnea_min_sec(),
            apnea_min_sec: defaults::apnea_min_sec(),
            recovery_min_sec: defaults::recovery_min_sec(),
            signal_ok_window_ms: defaults::signal_ok_window_ms(),
            rail_margin_mv: defaults::rail_margin_mv(),
            spike_deriv_mv: defaults::spike_deriv_mv(),
            rms_burst_factor: defaults::rms_burst_factor(),
            burst_pre_ms: defaults::burst_pre_ms(),
            burst_post_ms: defaults::burst_post_ms(),
            telemetry_capacity: defaults::telemetry_capacity(),
        }
    }
}

impl PipelineConfig {
    /// Copy with the silent clamps applied (rate >= 1, taps in range, capacity >= 1)
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.processing_rate_hz = config.processing_rate_hz.max(signal::MIN_PROCESSING_RATE_HZ);
        config.anti_ring_taps = config
            .anti_ring_taps
            .clamp(filters::MIN_ANTI_RING_TAPS, filters::MAX_ANTI_RING_TAPS);
        config.telemetry_capacity = config.telemetry_capacity.max(buffers::MIN_TELEMETRY_CAPACITY);
        config
    }

    /// Describe each value [`sanitized`](Self::sanitized) would change
    pub fn adjustments(&self) -> Vec<String> {
        let clamped = self.sanitized();
        let mut notes = Vec::new();

        if clamped.processing_rate_hz != self.processing_rate_hz {
            notes.push(format!(
                "processing_rate_hz {} raised to {}",
                self.processing_rate_hz, clamped.processing_rate_hz
            ));
        }
        if clamped.anti_ring_taps != self.anti_ring_taps {
            notes.push(format!(
                "anti_ring_taps {} clamped to {}",
                self.anti_ring_taps, clamped.anti_ring_taps
            ));
        }
        if clamped.telemetry_capacity != self.telemetry_capacity {
            notes.push(format!(
                "telemetry_capacity {} raised to {}",
                self.telemetry_capacity, clamped.telemetry_capacity
            ));
        }
        notes
    }

    /// Converter mux inputs in frame order
    pub fn channel_indices(&self) -> [u8; signal::CHANNEL_COUNT] {
        [self.channel1_index, self.channel2_index]
    }
}

/// Coefficients and thresholds recomputed whenever the configuration changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedCoefficients {
    pub alpha_dc: f32,
    pub alpha_env: f32,
    pub alpha_thr: f32,
    pub threshold_factor: f32,
    pub taps: usize,
    pub lsb_mv: f32,
    pub rail_mv: f32,
    pub rail_margin_mv: f32,
    pub spike_deriv_mv: f32,
    pub rms_burst_factor: f32,
    pub min_peak_distance_ms: u64,
    pub refractory_ms: u64,
    pub hypopnea_frac: f32,
    pub hypopnea_min_ms: u64,
    pub apnea_min_ms: u64,
    pub signal_ok_window_ms: u64,
    pub tick_period_ms: u32,
}

impl DerivedCoefficients {
    /// Derive from a configuration; the clamps of [`PipelineConfig::sanitized`] apply
    pub fn from_config(config: &PipelineConfig) -> Self {
        let config = config.sanitized();
        let rate = config.processing_rate_hz;

        Self {
            alpha_dc: alpha_from_tau(config.baseline_tau_sec, rate),
            alpha_env: alpha_from_tau(config.envelope_tau_sec, rate),
            alpha_thr: alpha_from_tau(config.threshold_tau_sec, rate),
            threshold_factor: config.threshold_factor,
            taps: config.anti_ring_taps as usize,
            lsb_mv: lsb_millivolts(config.adc_model, config.adc_gain),
            rail_mv: rail_millivolts(config.adc_gain),
            rail_margin_mv: config.rail_margin_mv,
            spike_deriv_mv: config.spike_deriv_mv,
            rms_burst_factor: config.rms_burst_factor,
            min_peak_distance_ms: seconds_to_millis(config.min_peak_distance_sec),
            refractory_ms: seconds_to_millis(config.refractory_sec),
            hypopnea_frac: config.hypopnea_frac,
            hypopnea_min_ms: seconds_to_millis(config.hypopnea_min_sec),
            apnea_min_ms: seconds_to_millis(config.apnea_min_sec),
            signal_ok_window_ms: config.signal_ok_window_ms as u64,
            tick_period_ms: (time::MILLISECONDS_PER_SECOND as u32 / rate).max(1),
        }
    }
}

impl Default for DerivedCoefficients {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
