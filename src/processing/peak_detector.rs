// src/processing/peak_detector.rs
//! Edge-triggered breath detection and median rate estimate

use crate::acquisition::ring_buffer::Ring;
use crate::config::constants::peaks;
use crate::config::DerivedCoefficients;
use crate::processing::filter_chain::ChannelState;

/// A breath accepted by the debouncer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedPeak {
    pub timestamp_ms: u64,
    /// Seconds since the previous accepted peak, absent for the first one
    pub interval_sec: Option<f32>,
}

impl AcceptedPeak {
    /// Instantaneous rate when the interval is physiologically plausible (6..300 bpm)
    pub fn instantaneous_bpm(&self) -> Option<f32> {
        self.interval_sec
            .filter(|&ibi| ibi > peaks::MIN_IBI_SEC && ibi < peaks::MAX_IBI_SEC)
            .map(|ibi| 60.0 / ibi)
    }
}

/// Rising-edge detector with minimum-distance and refractory debouncing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakDetector {
    min_peak_distance_ms: u64,
    refractory_ms: u64,
}

impl PeakDetector {
    pub fn new(coeffs: &DerivedCoefficients) -> Self {
        Self {
            min_peak_distance_ms: coeffs.min_peak_distance_ms,
            refractory_ms: coeffs.refractory_ms,
        }
    }

    /// Feed one artifact-free tick; `above` is the envelope-at-or-above-threshold flag
    pub fn detect(&self, channel: &mut ChannelState, above: bool, now_ms: u64) -> Option<AcceptedPeak> {
        let rising = above && !channel.prev_above;
        channel.prev_above = above;
        if !rising {
            return None;
        }

        let elapsed = |since: Option<u64>| since.map(|t| now_ms.saturating_sub(t));
        let distance_ok = elapsed(channel.last_peak_ms).map_or(true, |d| d >= self.min_peak_distance_ms);
        let refractory_ok = elapsed(channel.last_accepted_ms).map_or(true, |d| d >= self.refractory_ms);
        if !(distance_ok && refractory_ok) {
            return None;
        }

        let interval_sec = elapsed(channel.last_peak_ms).map(|d| d as f32 / 1000.0);
        channel.last_peak_ms = Some(now_ms);
        channel.last_accepted_ms = Some(now_ms);
        channel.last_env_peak = channel.env;

        Some(AcceptedPeak {
            timestamp_ms: now_ms,
            interval_sec,
        })
    }
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self::new(&DerivedCoefficients::default())
    }
}

/// Median of a slice; even lengths average the two middle values
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    median_in_place(&mut sorted)
}

/// Median that sorts the caller's buffer instead of copying it
pub fn median_in_place(sorted: &mut [f32]) -> Option<f32> {
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sliding window of instantaneous rates
#[derive(Debug, Clone)]
pub struct RateWindow {
    rates: Ring<f32>,
    bpm: f32,
}

impl RateWindow {
    pub fn new() -> Self {
        Self {
            rates: Ring::new(peaks::RATE_WINDOW_LEN),
            bpm: 0.0,
        }
    }

    /// Add a rate and return the refreshed median
    pub fn push(&mut self, rate_bpm: f32) -> f32 {
        self.rates.push(rate_bpm);
        let mut window = [0.0f32; peaks::RATE_WINDOW_LEN];
        for (slot, rate) in window.iter_mut().zip(self.rates.iter()) {
            *slot = *rate;
        }
        let filled = self.rates.len().min(window.len());
        self.bpm = median_in_place(&mut window[..filled]).unwrap_or(0.0);
        self.bpm
    }

    /// Current estimate, zero before the first interval
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self::new()
    }
}
